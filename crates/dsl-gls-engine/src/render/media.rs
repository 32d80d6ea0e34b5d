//! Media references from `[s]` and `[video]` tags.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Sound,
    Picture,
    Video,
    Unknown,
}

const SOUND: &[&str] = &[
    "wav", "au", "voc", "ogg", "oga", "opus", "mp3", "m4a", "aac", "flac", "mid", "wv", "ape", "spx",
];
const PICTURE: &[&str] = &[
    "bmp", "jpg", "jpeg", "gif", "png", "tga", "tif", "tiff", "djv", "djvu", "svg", "webp", "ico",
];
const VIDEO: &[&str] = &[
    "mpg", "mpeg", "mpe", "avi", "ogv", "ogm", "mkv", "mp4", "m4v", "mov", "wmv", "flv", "webm", "3gp",
];

impl MediaKind {
    /// Classifies a file name by its extension, ignoring case.
    pub fn of(file_name: &str) -> Self {
        let Some(ext) = Path::new(file_name).extension().and_then(|e| e.to_str()) else {
            return MediaKind::Unknown;
        };
        let ext = ext.to_ascii_lowercase();
        if SOUND.contains(&ext.as_str()) {
            MediaKind::Sound
        } else if PICTURE.contains(&ext.as_str()) {
            MediaKind::Picture
        } else if VIDEO.contains(&ext.as_str()) {
            MediaKind::Video
        } else {
            MediaKind::Unknown
        }
    }
}

/// `scheme://host/path` with every path segment percent-encoded.
pub fn resource_url(scheme: &str, host: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    let encoded: Vec<_> = path.split('/').map(urlencoding::encode).collect();
    format!("{scheme}://{host}/{}", encoded.join("/"))
}

/// Script registering a sound link so the first one on a page can be
/// played automatically.
pub fn audio_link_script(url: &str, dictionary_id: &str) -> String {
    let quoted = format!("\"{}\"", url.replace('\'', "\\'"));
    format!(
        "<script type=\"text/javascript\">gdAudioLinks.first = gdAudioLinks.first || {quoted};\
         gdAudioLinks[\"{dictionary_id}\"] = gdAudioLinks[\"{dictionary_id}\"] || {quoted};</script>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("hello.wav", MediaKind::Sound)]
    #[case("HELLO.MP3", MediaKind::Sound)]
    #[case("pic.JPG", MediaKind::Picture)]
    #[case("clip.webm", MediaKind::Video)]
    #[case("notes.txt", MediaKind::Unknown)]
    #[case("no_extension", MediaKind::Unknown)]
    fn classification(#[case] name: &str, #[case] kind: MediaKind) {
        assert_eq!(MediaKind::of(name), kind);
    }

    #[test]
    fn urls_encode_each_segment() {
        assert_eq!(
            resource_url("bres", "abc", "dir/my file.png"),
            "bres://abc/dir/my%20file.png"
        );
        assert_eq!(resource_url("gdau", "search", "a.wav"), "gdau://search/a.wav");
    }
}
