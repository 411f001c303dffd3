//! Documentation comment translation.
//!
//! The embedded XML content is re-walked node by node rather than copied as
//! flat text: code references rewrite their generic notation, abutting
//! non-text nodes are bridged with a synthetic single space, and every
//! physical output line is prefixed with the target exterior marker `'''`
//! (the target doc-comment grammar requires the marker on every line).
//!
//! A structural visit failure degrades the offending content to raw text —
//! the comment survives verbatim under the exterior marker.

use cs2vb_syntax::{
    parse_doc_comment, DocXmlElement, DocXmlNode, Trivia, TriviaKind,
};
use tracing::debug;

/// Translate a `///` or `/** … */` documentation comment into a sequence of
/// `'''` lines with interior line breaks (the final break is the run-level
/// rule's job).
pub(crate) fn translate_doc_comment(trivia: &Trivia) -> Vec<Trivia> {
    let body = doc_body(trivia);
    let rendered = match parse_doc_comment(&body) {
        Ok(nodes) => render_nodes(&nodes),
        Err(error) => {
            debug!(%error, span = %trivia.span(), "doc comment fell back to raw text");
            body.clone()
        }
    };

    let mut out = Vec::new();
    for (index, line) in rendered.split('\n').enumerate() {
        if index > 0 {
            out.push(Trivia::end_of_line());
        }
        out.push(Trivia::synthetic(
            TriviaKind::DocCommentLine,
            exterior_line(line),
        ));
    }
    out
}

/// Extract the XML body of a doc comment, stripping the per-line exterior
/// markers (`///`, or the block form's delimiters and aligned asterisks).
fn doc_body(trivia: &Trivia) -> String {
    match trivia.kind() {
        TriviaKind::DocCommentBlock => {
            let body = trivia.body();
            body.split('\n')
                .enumerate()
                .map(|(index, line)| {
                    if index == 0 {
                        line
                    } else {
                        strip_aligned_prefix(line)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        _ => trivia
            .text()
            .split('\n')
            .map(strip_exterior_marker)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn strip_exterior_marker(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    trimmed
        .strip_prefix("///")
        .or_else(|| trimmed.strip_prefix("'''"))
        .unwrap_or(line)
}

fn strip_aligned_prefix(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    if trimmed.starts_with('*') {
        trimmed.trim_start_matches('*')
    } else {
        line
    }
}

/// A physical output line: exterior marker first, always.
fn exterior_line(line: &str) -> String {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with([' ', '\t']) {
        format!("'''{line}")
    } else {
        format!("''' {line}")
    }
}

/// Serialize doc-XML nodes in target spelling, bridging abutting non-text
/// nodes with a synthetic single space so the per-line marker logic always
/// has a text gap to attach to.
fn render_nodes(nodes: &[DocXmlNode]) -> String {
    let mut out = String::new();
    let mut previous_was_structural = false;
    for node in nodes {
        if previous_was_structural && !node.is_text() {
            out.push(' ');
        }
        render_node(node, &mut out);
        previous_was_structural = !node.is_text();
    }
    out
}

fn render_node(node: &DocXmlNode, out: &mut String) {
    match node {
        DocXmlNode::Text(text) => out.push_str(text),
        DocXmlNode::CData(content) => {
            out.push_str("<![CDATA[");
            out.push_str(content);
            out.push_str("]]>");
        }
        DocXmlNode::Element(element) => render_element(element, out),
    }
}

fn render_element(element: &DocXmlElement, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for attribute in &element.attributes {
        out.push(' ');
        out.push_str(&attribute.name);
        out.push_str("=\"");
        if attribute.is_cref() {
            // Generic notation `List{T}` spells `List(Of T)` in the target.
            out.push_str(&attribute.value.replace('{', "(Of ").replace('}', ")"));
        } else {
            out.push_str(&attribute.value);
        }
        out.push('"');
    }
    if element.self_closing {
        out.push_str("/>");
    } else {
        out.push('>');
        out.push_str(&render_nodes(&element.children));
        out.push_str("</");
        out.push_str(&element.name);
        out.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs2vb_syntax::TriviaList;
    use pretty_assertions::assert_eq;

    fn render(out: Vec<Trivia>) -> String {
        TriviaList::from_vec(out).render()
    }

    #[test]
    fn test_single_line_summary() {
        let t = Trivia::synthetic(TriviaKind::DocCommentLine, "/// <summary>Adds.</summary>");
        assert_eq!(
            render(translate_doc_comment(&t)),
            "''' <summary>Adds.</summary>"
        );
    }

    #[test]
    fn test_multi_line_doc_comment() {
        let t = Trivia::synthetic(
            TriviaKind::DocCommentLine,
            "/// <summary>\n/// Adds numbers.\n/// </summary>",
        );
        assert_eq!(
            render(translate_doc_comment(&t)),
            "''' <summary>\n''' Adds numbers.\n''' </summary>"
        );
    }

    #[test]
    fn test_cref_generics_rewritten() {
        let t = Trivia::synthetic(
            TriviaKind::DocCommentLine,
            "/// <summary>See <see cref=\"List{T}\"/>.</summary>",
        );
        assert_eq!(
            render(translate_doc_comment(&t)),
            "''' <summary>See <see cref=\"List(Of T)\"/>.</summary>"
        );
    }

    #[test]
    fn test_abutting_elements_bridged() {
        let t = Trivia::synthetic(
            TriviaKind::DocCommentLine,
            "/// <summary>a</summary><remarks>b</remarks>",
        );
        assert_eq!(
            render(translate_doc_comment(&t)),
            "''' <summary>a</summary> <remarks>b</remarks>"
        );
    }

    #[test]
    fn test_malformed_xml_falls_back_to_raw_text() {
        let t = Trivia::synthetic(TriviaKind::DocCommentLine, "/// <summary>unclosed");
        assert_eq!(render(translate_doc_comment(&t)), "''' <summary>unclosed");
    }

    #[test]
    fn test_doc_block_aligned_asterisks() {
        let t = Trivia::synthetic(
            TriviaKind::DocCommentBlock,
            "/** <summary>\n * Adds.\n * </summary> */",
        );
        assert_eq!(
            render(translate_doc_comment(&t)),
            "''' <summary>\n''' Adds.\n''' </summary>"
        );
    }
}
