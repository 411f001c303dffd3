//! Preprocessor directive translation.
//!
//! Supported directives translate structurally 1:1 (`#if` → `#If … Then`,
//! `#region` → `#Region`, …). Conditions are rewritten with a fixed operator
//! replacement table, not a full expression re-parse. Unsupported kinds
//! degrade to a marker comment carrying the verbatim source text so nothing
//! is lost silently.
//!
//! Inside expression contexts the target grammar forbids directives
//! entirely; conditional directives translated there render as inert
//! comments and the translator's directive depth tracks the nesting.

use cs2vb_syntax::{DirectiveKind, Trivia, TriviaKind};

use super::comments::comment_text;
use super::TriviaTranslator;

/// Marker prefixed to the verbatim text of a directive the target grammar
/// cannot express.
pub const UNSUPPORTED_MARKER: &str = "UNSUPPORTED:";

/// Translate one directive trivia.
pub(crate) fn translate_directive(
    translator: &mut TriviaTranslator,
    trivia: &Trivia,
    kind: DirectiveKind,
) -> Vec<Trivia> {
    let text = trivia.text().trim_end();

    // Conditional directives inside expression contexts render inert.
    if let DirectiveKind::If | DirectiveKind::ElseIf | DirectiveKind::Else | DirectiveKind::EndIf =
        kind
    {
        if translator.in_expression_context() || translator.directive_depth() > 0 {
            if kind == DirectiveKind::If {
                translator.raise_directive_depth();
            }
            let rendered = structural_text(text, kind);
            if kind == DirectiveKind::EndIf {
                translator.lower_directive_depth();
            }
            return vec![Trivia::line_comment(comment_text(&rendered))];
        }
    }

    match kind {
        DirectiveKind::If
        | DirectiveKind::ElseIf
        | DirectiveKind::Else
        | DirectiveKind::EndIf
        | DirectiveKind::Region
        | DirectiveKind::EndRegion
        | DirectiveKind::Define
        | DirectiveKind::Undef
        | DirectiveKind::Checksum => {
            vec![Trivia::synthetic(
                TriviaKind::Directive(kind),
                structural_text(text, kind),
            )]
        }
        DirectiveKind::Unsupported(_) => {
            vec![Trivia::line_comment(format!("' {UNSUPPORTED_MARKER} {text}"))]
        }
    }
}

/// Build the target spelling of a supported directive.
fn structural_text(text: &str, kind: DirectiveKind) -> String {
    let (rest, comment) = split_trailing_comment(directive_rest(text));
    let mut out = match kind {
        DirectiveKind::If => format!("#If {} Then", rewrite_condition(rest)),
        DirectiveKind::ElseIf => format!("#ElseIf {} Then", rewrite_condition(rest)),
        DirectiveKind::Else => "#Else".to_owned(),
        DirectiveKind::EndIf => "#End If".to_owned(),
        DirectiveKind::Region => format!("#Region {}", quoted_region_name(rest)),
        DirectiveKind::EndRegion => "#End Region".to_owned(),
        DirectiveKind::Define => format!("#Const {rest} = True"),
        DirectiveKind::Undef => format!("#Const {rest} = False"),
        DirectiveKind::Checksum => format!("#ExternalChecksum({})", checksum_arguments(rest)),
        DirectiveKind::Unsupported(_) => text.to_owned(),
    };
    // The directive's own trailing comment travels with it, translated.
    if let Some(comment) = comment {
        out.push(' ');
        out.push_str(&comment_text(comment));
    }
    out
}

/// The directive text after `#` and the keyword (and after `pragma
/// checksum`'s two keywords), trimmed.
fn directive_rest(text: &str) -> &str {
    let text = text.trim_start();
    let text = text.strip_prefix('#').unwrap_or(text).trim_start();
    let text = match text.strip_prefix("pragma") {
        Some(rest) => rest.trim_start(),
        None => text,
    };
    match text.find(|c: char| c.is_whitespace()) {
        Some(pos) => text[pos..].trim(),
        None => "",
    }
}

/// The trailing comment of a directive line, as a source-form trivia run.
///
/// `#if DEBUG // note` yields a run holding `// note`; a directive without
/// a trailing comment yields an empty run. Used by the conversion surface
/// to append a directive's end-of-line content onto a target token.
pub fn directive_trailing_run(text: &str) -> cs2vb_syntax::TriviaList {
    let (_, comment) = split_trailing_comment(text.trim_end());
    match comment {
        Some(comment) => cs2vb_syntax::TriviaList::from_vec(vec![
            Trivia::space(),
            Trivia::synthetic(TriviaKind::LineComment, format!("//{comment}")),
        ]),
        None => cs2vb_syntax::TriviaList::new(),
    }
}

/// Split `rest` at a `//` comment marker outside string literals.
fn split_trailing_comment(rest: &str) -> (&str, Option<&str>) {
    let bytes = rest.as_bytes();
    let mut in_string = false;
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'"' => in_string = !in_string,
            b'/' if !in_string && bytes.get(index + 1) == Some(&b'/') => {
                return (rest[..index].trim_end(), Some(&rest[index + 2..]));
            }
            _ => {}
        }
        index += 1;
    }
    (rest, None)
}

/// Region names are quoted in the target grammar; an already-quoted name is
/// preserved exactly.
fn quoted_region_name(name: &str) -> String {
    if name.starts_with('"') {
        name.to_owned()
    } else {
        format!("\"{name}\"")
    }
}

/// Reassemble `#pragma checksum`'s three quoted arguments as a call
/// argument list. Anything unparseable is passed through verbatim.
fn checksum_arguments(rest: &str) -> String {
    let parts: Vec<&str> = rest.split('"').collect();
    // "file" "{guid}" "bytes" splits into 7 parts with quotes at odd indices.
    if parts.len() == 7 {
        format!("\"{}\", \"{}\", \"{}\"", parts[1], parts[3], parts[5])
    } else {
        rest.to_owned()
    }
}

/// Rewrite a `#if` condition with the fixed operator replacement table:
/// `==` → `=`, `!=` → `<>`, `&&` → `AndAlso`, `||` → `OrElse`, `!` → `Not`,
/// `true`/`false` → `True`/`False`. String literals pass through verbatim.
pub fn rewrite_condition(cond: &str) -> String {
    let mut out = String::with_capacity(cond.len());
    let mut chars = cond.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        match c {
            '"' => {
                let mut end = cond.len();
                for (pos, quoted) in chars.by_ref() {
                    if quoted == '"' {
                        end = pos + 1;
                        break;
                    }
                }
                out.push_str(&cond[start..end.max(start + 1)]);
            }
            '=' if matches!(chars.peek(), Some((_, '='))) => {
                chars.next();
                out.push('=');
            }
            '!' if matches!(chars.peek(), Some((_, '='))) => {
                chars.next();
                out.push_str("<>");
            }
            '&' if matches!(chars.peek(), Some((_, '&'))) => {
                chars.next();
                out.push_str("AndAlso");
            }
            '|' if matches!(chars.peek(), Some((_, '|'))) => {
                chars.next();
                out.push_str("OrElse");
            }
            '!' => {
                out.push_str("Not");
                if !matches!(chars.peek(), Some((_, ' '))) {
                    out.push(' ');
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = cond.len();
                while let Some((pos, w)) = chars.peek().copied() {
                    if w.is_alphanumeric() || w == '_' {
                        chars.next();
                    } else {
                        end = pos;
                        break;
                    }
                }
                match &cond[start..end] {
                    "true" => out.push_str("True"),
                    "false" => out.push_str("False"),
                    word => out.push_str(word),
                }
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn translate(text: &str, kind: DirectiveKind) -> String {
        let mut translator = TriviaTranslator::new();
        let trivia = Trivia::synthetic(TriviaKind::Directive(kind), text);
        let out = translate_directive(&mut translator, &trivia, kind);
        out.iter().map(Trivia::text).collect()
    }

    #[test]
    fn test_if_directive() {
        assert_eq!(translate("#if DEBUG", DirectiveKind::If), "#If DEBUG Then");
    }

    #[test]
    fn test_if_condition_operators() {
        assert_eq!(
            translate("#if DEBUG && !TRACE || X != 2", DirectiveKind::If),
            "#If DEBUG AndAlso Not TRACE OrElse X <> 2 Then"
        );
        assert_eq!(
            translate("#if FOO == true", DirectiveKind::If),
            "#If FOO = True Then"
        );
    }

    #[test]
    fn test_if_directive_trailing_comment_carried() {
        assert_eq!(
            translate("#if DEBUG // debug only", DirectiveKind::If),
            "#If DEBUG Then ' debug only"
        );
    }

    #[test]
    fn test_elif_else_endif() {
        assert_eq!(
            translate("#elif TRACE", DirectiveKind::ElseIf),
            "#ElseIf TRACE Then"
        );
        assert_eq!(translate("#else", DirectiveKind::Else), "#Else");
        assert_eq!(translate("#endif", DirectiveKind::EndIf), "#End If");
    }

    #[test]
    fn test_region_quoted_name_preserved() {
        assert_eq!(
            translate("#region \"Foo\"", DirectiveKind::Region),
            "#Region \"Foo\""
        );
        assert_eq!(
            translate("#endregion", DirectiveKind::EndRegion),
            "#End Region"
        );
    }

    #[test]
    fn test_region_bare_name_quoted() {
        assert_eq!(
            translate("#region Helpers", DirectiveKind::Region),
            "#Region \"Helpers\""
        );
    }

    #[test]
    fn test_define_undef() {
        assert_eq!(
            translate("#define TRACE", DirectiveKind::Define),
            "#Const TRACE = True"
        );
        assert_eq!(
            translate("#undef TRACE", DirectiveKind::Undef),
            "#Const TRACE = False"
        );
    }

    #[test]
    fn test_checksum() {
        assert_eq!(
            translate(
                "#pragma checksum \"a.cs\" \"{406EA660}\" \"AB12\"",
                DirectiveKind::Checksum
            ),
            "#ExternalChecksum(\"a.cs\", \"{406EA660}\", \"AB12\")"
        );
    }

    #[test]
    fn test_unsupported_degrades_to_marker_comment() {
        let out = translate(
            "#line 200",
            DirectiveKind::Unsupported(cs2vb_syntax::UnsupportedKind::Line),
        );
        assert_eq!(out, "' UNSUPPORTED: #line 200");
    }
}
