//! Expression printing for both grammars.
//!
//! A child is wrapped in parentheses iff it is a binary node of strictly lower
//! precedence than its parent.

use crate::error::Result;
use crate::render::{Format, PrintOptions};
use crate::sequence::SeqNode;

struct Symbols {
    also_run: &'static str,
    and_then: &'static str,
}

fn symbols(format: Format) -> Symbols {
    match format {
        Format::Source => Symbols {
            also_run: "*",
            and_then: "+",
        },
        Format::Config => Symbols {
            also_run: ",",
            and_then: "&",
        },
    }
}

/// Render an expression. Every module must carry a label.
pub fn render(node: &SeqNode, options: &PrintOptions, format: Format) -> Result<String> {
    match node {
        SeqNode::AlsoRun(left, right) => {
            binary(node, left, right, symbols(format).also_run, options, format)
        }
        SeqNode::AndThen(left, right) => {
            binary(node, left, right, symbols(format).and_then, options, format)
        }
        SeqNode::Atomic(m) => Ok(leaf_label(&m.require_label()?, options, format)),
        SeqNode::Negate(m) => {
            let label = leaf_label(&m.require_label()?, options, format);
            Ok(match format {
                Format::Source => format!("~{label}"),
                Format::Config => format!("!{label}"),
            })
        }
        SeqNode::Ignore(m) => {
            let label = leaf_label(&m.require_label()?, options, format);
            Ok(match format {
                Format::Source => format!("{}({label})", options.class_name("ignore")),
                Format::Config => format!("-{label}"),
            })
        }
        SeqNode::Placeholder(name) => Ok(match format {
            Format::Source => format!(
                "{}({})",
                options.class_name("SequencePlaceholder"),
                crate::types::strings::quote(name)
            ),
            Format::Config => name.clone(),
        }),
        SeqNode::Sequence(seq) => match seq.label() {
            Some(label) => Ok(leaf_label(&label, options, format)),
            None => render(&seq.root(), options, format),
        },
    }
}

fn binary(
    parent: &SeqNode,
    left: &SeqNode,
    right: &SeqNode,
    symbol: &str,
    options: &PrintOptions,
    format: Format,
) -> Result<String> {
    Ok(format!(
        "{}{symbol}{}",
        operand(parent, left, options, format)?,
        operand(parent, right, options, format)?
    ))
}

fn operand(
    parent: &SeqNode,
    child: &SeqNode,
    options: &PrintOptions,
    format: Format,
) -> Result<String> {
    let text = render(child, options, format)?;
    let wrap = match (effective_precedence(child), parent.precedence()) {
        (Some(c), Some(p)) => c < p,
        _ => false,
    };
    Ok(if wrap { format!("({text})") } else { text })
}

/// Unlabeled sequences print inline, so they bind like their root.
fn effective_precedence(node: &SeqNode) -> Option<u8> {
    match node {
        SeqNode::Sequence(seq) if seq.label().is_none() => effective_precedence(&seq.root()),
        other => other.precedence(),
    }
}

fn leaf_label(label: &str, options: &PrintOptions, format: Format) -> String {
    match format {
        Format::Source => options.label(label),
        Format::Config => label.to_string(),
    }
}
