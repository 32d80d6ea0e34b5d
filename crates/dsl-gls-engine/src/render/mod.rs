//! HTML rendering of parsed article markup.
//!
//! Every DSL tag maps to a fixed piece of HTML with `dsl_*` class names so a
//! stylesheet can present articles the way Lingvo does. Unknown tags still
//! render their children inside a `dsl_unknown` span.

pub mod media;

use dsl_gls_syntax::{Element, Node};
use html_escape::{encode_double_quoted_attribute, encode_text};
use unicode_normalization::UnicodeNormalization;

use crate::headword::normalize_headword;
use crate::index::AbbreviationTable;
use crate::lang::LanguageTable;
use media::{MediaKind, audio_link_script, resource_url};

/// Tooltips shorter than this get non-breaking spaces and hyphens.
const SHORT_TOOLTIP_CHARS: usize = 70;

const PLAY_ICON: &str =
    "<img src=\"qrcx://localhost/icons/playsound.png\" border=\"0\" align=\"absmiddle\" alt=\"Play\"/>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedHtml {
    pub html: String,
    /// Number of `[*]` optional parts rendered.
    pub optional_parts: usize,
}

/// Per-call state, reset for every top-level render.
#[derive(Debug, Default)]
struct RenderState {
    optional_parts: usize,
}

/// Renders markup trees with the read-only tables they need.
pub struct Renderer<'a> {
    /// Host used in resource URLs and element ids.
    pub dictionary_id: &'a str,
    pub abbreviations: &'a AbbreviationTable,
    pub languages: &'a dyn LanguageTable,
}

impl<'a> Renderer<'a> {
    pub fn new(
        dictionary_id: &'a str,
        abbreviations: &'a AbbreviationTable,
        languages: &'a dyn LanguageTable,
    ) -> Self {
        Self {
            dictionary_id,
            abbreviations,
            languages,
        }
    }

    /// Normalizes, parses and renders DSL markup.
    pub fn render_markup(&self, text: &str, display_headword: &str) -> RenderedHtml {
        let normalized: String = text.nfc().collect();
        let tree = dsl_gls_syntax::parse(&normalized, display_headword);
        self.render(&tree, display_headword)
    }

    /// Renders the children of `tree` (the root itself emits nothing).
    pub fn render(&self, tree: &Element, display_headword: &str) -> RenderedHtml {
        let mut state = RenderState::default();
        let html = self.children(tree, display_headword, &mut state);
        RenderedHtml {
            html,
            optional_parts: state.optional_parts,
        }
    }

    /// Prefix shared by optional part ids and the expand button.
    pub fn optional_id_prefix(&self) -> String {
        let short: String = self.dictionary_id.chars().take(7).collect();
        format!("O{short}_0")
    }

    fn children(&self, element: &Element, headword: &str, state: &mut RenderState) -> String {
        element
            .children
            .iter()
            .map(|child| self.node(child, headword, state))
            .collect()
    }

    fn node(&self, node: &Node, headword: &str, state: &mut RenderState) -> String {
        match node {
            Node::Text(text) => text_html(text),
            Node::Element(element) => self.element(element, headword, state),
        }
    }

    fn element(&self, el: &Element, headword: &str, state: &mut RenderState) -> String {
        let name = el.name.as_str();
        if name == "br" {
            return "<br />".to_string();
        }
        if name == "*" {
            let id = format!("{}_opt_{}", self.optional_id_prefix(), state.optional_parts);
            state.optional_parts += 1;
            let inner = self.children(el, headword, state);
            return format!("<span class=\"dsl_opt\" id=\"{id}\">{inner}</span>");
        }

        let inner = self.children(el, headword, state);
        match name {
            "b" => format!("<b class=\"dsl_b\">{inner}</b>"),
            "i" => format!("<i class=\"dsl_i\">{inner}</i>"),
            "u" => {
                // A leading blank stays visible but is not underlined.
                let lead = if inner.starts_with([' ', '\t']) { " " } else { "" };
                format!("{lead}<span class=\"dsl_u\">{inner}</span>")
            }
            "c" => {
                let color = if el.attrs.is_empty() {
                    "c_default_color".into()
                } else {
                    encode_double_quoted_attribute(&el.attrs)
                };
                format!("<font color=\"{color}\">{inner}</font>")
            }
            "m" => format!("<div class=\"dsl_m\">{inner}</div>"),
            _ if is_indent_level(name) => format!("<div class=\"dsl_{name}\">{inner}</div>"),
            "trn" | "ex" | "com" | "t" => format!("<span class=\"dsl_{name}\">{inner}</span>"),
            "!trs" => format!("<span class=\"dsl_trs\">{inner}</span>"),
            "s" | "video" => self.media(el, inner),
            "url" => {
                let text = encode_double_quoted_attribute(&el.render_as_text()).into_owned();
                let link = if has_scheme(&text) {
                    text
                } else {
                    format!("http://{text}")
                };
                format!("<a class=\"dsl_url\" href=\"{link}\">{inner}</a>")
            }
            "p" => {
                let title = self
                    .abbreviations
                    .get(&el.render_as_text())
                    .map(tooltip_title)
                    .map(|t| format!(" title=\"{}\"", encode_double_quoted_attribute(&t)))
                    .unwrap_or_default();
                format!("<span class=\"dsl_p\"{title}>{inner}</span>")
            }
            "'" => format!(
                "<span class=\"dsl_stress\"><span class=\"dsl_stress_without_accent\">{inner}</span>\
                 <span class=\"dsl_stress_with_accent\">{inner}\u{301}</span></span>"
            ),
            "lang" => {
                let lang = self
                    .lang_code(&el.attrs)
                    .map(|code| format!(" lang=\"{code}\""))
                    .unwrap_or_default();
                format!("<span class=\"dsl_lang\"{lang}>{inner}</span>")
            }
            "ref" => {
                let mut url = resource_url("gdlookup", "localhost", &el.render_as_text());
                let attrs = el.attrs.replace('"', "");
                if let Some((key, value)) = attrs.split_once('=')
                    && !key.trim().is_empty()
                {
                    url.push_str(&format!(
                        "?{}={}",
                        urlencoding::encode(key.trim()),
                        urlencoding::encode(value.trim())
                    ));
                }
                format!("<a class=\"dsl_ref\" href=\"{url}\">{inner}</a>")
            }
            "@" => {
                let target = normalize_headword(&el.render_as_text());
                let url = resource_url("gdlookup", "localhost", &target);
                format!("<a class=\"dsl_ref\" href=\"{url}\">{inner}</a>")
            }
            "sub" => format!("<sub>{inner}</sub>"),
            "sup" => format!("<sup>{inner}</sup>"),
            _ => {
                log::debug!("unknown tag [{name}] in article \"{headword}\"");
                format!("<span class=\"dsl_unknown\">{inner}</span>")
            }
        }
    }

    fn media(&self, el: &Element, inner: String) -> String {
        let file = el.render_as_text();
        let file = file.trim();
        match MediaKind::of(file) {
            MediaKind::Sound => {
                let url = resource_url("gdau", "search", file);
                format!(
                    "{}<span class=\"dsl_s_wav\"><a href=\"{url}\">{PLAY_ICON}</a></span>",
                    audio_link_script(&url, self.dictionary_id)
                )
            }
            MediaKind::Picture => {
                let url = resource_url("bres", self.dictionary_id, file);
                format!(
                    "<img src=\"{url}\" alt=\"{}\"/>",
                    encode_double_quoted_attribute(file)
                )
            }
            MediaKind::Video => {
                let url = resource_url("gdvideo", self.dictionary_id, file);
                format!(
                    "<a class=\"dsl_s dsl_video\" href=\"{url}\"><span class=\"img\"></span>\
                     <span class=\"filename\">{inner}</span></a>"
                )
            }
            MediaKind::Unknown => {
                let url = resource_url("bres", self.dictionary_id, file);
                format!("<a class=\"dsl_s\" href=\"{url}\">{inner}</a>")
            }
        }
    }

    /// ISO code from `id=NNNN` or `name="Language"` attributes.
    fn lang_code(&self, attrs: &str) -> Option<String> {
        if let Some(pos) = attrs.find("id=") {
            let digits: String = attrs[pos + 3..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            let id = digits.parse::<u32>().ok().filter(|id| *id != 0)?;
            return self.languages.code_for_id(id).map(str::to_string);
        }

        let start = attrs.find("name=\"")? + 6;
        let len = attrs[start..].find('"')?;
        let id = self.languages.id_for_name(&attrs[start..start + len])?;
        self.languages.code_for_id(id).map(str::to_string)
    }
}

fn text_html(text: &str) -> String {
    encode_text(text).replace('\r', "").replace('\n', "<p></p>")
}

fn is_indent_level(name: &str) -> bool {
    let mut chars = name.chars();
    matches!((chars.next(), chars.next(), chars.next()), (Some('m'), Some(d), None) if d.is_ascii_digit())
}

fn has_scheme(link: &str) -> bool {
    let Some((scheme, _)) = link.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Short expansions keep together on one line like Lingvo tooltips.
fn tooltip_title(expansion: &str) -> String {
    if expansion.chars().count() >= SHORT_TOOLTIP_CHARS {
        return expansion.to_string();
    }
    expansion
        .chars()
        .map(|c| match c {
            ' ' | '\t' => '\u{a0}',
            '-' => '\u{2011}',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::BuiltinLanguages;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const ID: &str = "abcdefghijklmnop";

    fn render_with(text: &str, abbreviations: &AbbreviationTable) -> RenderedHtml {
        Renderer::new(ID, abbreviations, &BuiltinLanguages).render_markup(text, "test")
    }

    fn html(text: &str) -> String {
        render_with(text, &AbbreviationTable::default()).html
    }

    #[rstest]
    #[case("a < b & c", "a &lt; b &amp; c")]
    #[case("one\ntwo", "one<p></p>two")]
    #[case("[b]bold[/b]", "<b class=\"dsl_b\">bold</b>")]
    #[case("[i]it[/i]", "<i class=\"dsl_i\">it</i>")]
    #[case("x[u] under[/u]", "x <span class=\"dsl_u\"> under</span>")]
    #[case("[c]c[/c]", "<font color=\"c_default_color\">c</font>")]
    #[case("[c red]c[/c]", "<font color=\"red\">c</font>")]
    #[case("[m]x[/m]", "<div class=\"dsl_m\">x</div>")]
    #[case("[m3]x[/m]", "<div class=\"dsl_m3\">x</div>")]
    #[case("[trn]t[/trn]", "<span class=\"dsl_trn\">t</span>")]
    #[case("[ex]e[/ex]", "<span class=\"dsl_ex\">e</span>")]
    #[case("[com]c[/com]", "<span class=\"dsl_com\">c</span>")]
    #[case("[t]t[/t]", "<span class=\"dsl_t\">t</span>")]
    #[case("[!trs]x[/!trs]", "<span class=\"dsl_trs\">x</span>")]
    #[case("H[sub]2[/sub]O[sup]x[/sup]", "H<sub>2</sub>O<sup>x</sup>")]
    #[case("a[br]b", "a<br />b")]
    #[case("[foo]kept[/foo]", "<span class=\"dsl_unknown\">kept</span>")]
    #[case("[lang id=1031]Haus[/lang]", "<span class=\"dsl_lang\" lang=\"de\">Haus</span>")]
    #[case("[lang name=\"French\"]maison[/lang]", "<span class=\"dsl_lang\" lang=\"fr\">maison</span>")]
    #[case("[lang id=9999]x[/lang]", "<span class=\"dsl_lang\">x</span>")]
    #[case("[url]example.com[/url]", "<a class=\"dsl_url\" href=\"http://example.com\">example.com</a>")]
    #[case("[url]https://a.org[/url]", "<a class=\"dsl_url\" href=\"https://a.org\">https://a.org</a>")]
    #[case("<<big cat>>", "<a class=\"dsl_ref\" href=\"gdlookup://localhost/big%20cat\">big cat</a>")]
    #[case("[ref dict=\"Other\"]word[/ref]", "<a class=\"dsl_ref\" href=\"gdlookup://localhost/word?dict=Other\">word</a>")]
    #[case("[ref =x]word[/ref]", "<a class=\"dsl_ref\" href=\"gdlookup://localhost/word\">word</a>")]
    #[case("\t@ sub  word", "<a class=\"dsl_ref\" href=\"gdlookup://localhost/sub%20word\">sub  word</a>")]
    fn tags(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(html(input), expected);
    }

    #[test]
    fn unknown_tags_keep_nested_content() {
        assert_eq!(
            html("[zz][b]x[/b] & y[/zz]"),
            "<span class=\"dsl_unknown\"><b class=\"dsl_b\">x</b> &amp; y</span>"
        );
    }

    #[test]
    fn br_ignores_children_and_attributes() {
        assert_eq!(html("[br x]"), "<br />");
    }

    #[test]
    fn optional_parts_are_numbered_per_render() {
        let table = AbbreviationTable::default();
        let renderer = Renderer::new(ID, &table, &BuiltinLanguages);
        let first = renderer.render_markup("[*]a[/*] [*]b[/*]", "w");
        assert_eq!(first.optional_parts, 2);
        assert_eq!(
            first.html,
            "<span class=\"dsl_opt\" id=\"Oabcdefg_0_opt_0\">a</span> \
             <span class=\"dsl_opt\" id=\"Oabcdefg_0_opt_1\">b</span>"
        );

        let second = renderer.render_markup("[*]c[/*]", "w");
        assert_eq!(second.optional_parts, 1);
        assert!(second.html.contains("Oabcdefg_0_opt_0"));
    }

    #[test]
    fn stress_renders_both_forms() {
        assert_eq!(
            html("d[']o[/']g"),
            "d<span class=\"dsl_stress\"><span class=\"dsl_stress_without_accent\">o</span>\
             <span class=\"dsl_stress_with_accent\">o\u{301}</span></span>g"
        );
    }

    #[test]
    fn tooltips_come_from_the_abbreviation_table() {
        let table: AbbreviationTable = [
            ("n", "noun"),
            ("smb", "some-body else"),
            ("long", "x".repeat(80).as_str()),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            render_with("[p]n[/p]", &table).html,
            "<span class=\"dsl_p\" title=\"noun\">n</span>"
        );
        assert_eq!(
            render_with("[p]SMB[/p]", &table).html,
            "<span class=\"dsl_p\" title=\"some\u{2011}body\u{a0}else\">SMB</span>"
        );
        assert_eq!(
            render_with("[p]long[/p]", &table).html,
            format!("<span class=\"dsl_p\" title=\"{}\">long</span>", "x".repeat(80))
        );
        assert_eq!(
            render_with("[p]zzz[/p]", &table).html,
            "<span class=\"dsl_p\">zzz</span>"
        );
    }

    #[test]
    fn sound_links_register_an_audio_script() {
        assert_snapshot!(html("[s]hello.wav[/s]"), @r#"<script type="text/javascript">gdAudioLinks.first = gdAudioLinks.first || "gdau://search/hello.wav";gdAudioLinks["abcdefghijklmnop"] = gdAudioLinks["abcdefghijklmnop"] || "gdau://search/hello.wav";</script><span class="dsl_s_wav"><a href="gdau://search/hello.wav"><img src="qrcx://localhost/icons/playsound.png" border="0" align="absmiddle" alt="Play"/></a></span>"#);
    }

    #[rstest]
    #[case("[s]pic.png[/s]", "<img src=\"bres://abcdefghijklmnop/pic.png\" alt=\"pic.png\"/>")]
    #[case(
        "[video]clip.mp4[/video]",
        "<a class=\"dsl_s dsl_video\" href=\"gdvideo://abcdefghijklmnop/clip.mp4\"><span class=\"img\"></span><span class=\"filename\">clip.mp4</span></a>"
    )]
    #[case("[s]doc.pdf[/s]", "<a class=\"dsl_s\" href=\"bres://abcdefghijklmnop/doc.pdf\">doc.pdf</a>")]
    fn media_references(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(html(input), expected);
    }
}
