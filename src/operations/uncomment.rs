//! Uncomment decisions
//!
//! Walks the classified lines once. Commented data lines resolved in the
//! structure model are re-emitted without their comment marker at the
//! indent their node's depth implies. Uncommenting a container starts a
//! cascade that also uncomments the commented data lines nested below it,
//! resolved or not, until a line at or left of the container's indent.

use crate::config::Options;
use crate::diagnostics::Diagnostics;
use crate::model::structure::StructureModel;
use crate::template::line::{Classification, TemplateLine, strip_terminator};
use std::borrow::Cow;

/// One output line, in bijection with the template line it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecidedLine {
    /// 1-based template line number
    pub line_no: usize,
    /// Emitted text without terminator
    pub text: String,
    pub terminator: &'static str,
    /// Template text without terminator
    pub original: String,
    pub uncommented: bool,
}

impl DecidedLine {
    /// Restore the template text
    pub fn revert(&mut self) {
        self.text.clone_from(&self.original);
        self.uncommented = false;
    }
}

/// Counters collected while deciding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionStats {
    pub uncommented: usize,
    pub constraints_seen: usize,
    /// Commented data lines left commented
    pub inactive_unmatched: usize,
}

/// An open cascade below an uncommented container
#[derive(Debug)]
struct Cascade {
    /// Template indent of the container line
    until_indent: usize,
    /// `(template indent, emitted indent)` of the uncommented lines above
    /// the current one, innermost last
    frames: Vec<(usize, usize)>,
}

impl Cascade {
    /// Emitted indent for a line at `source_indent` one level below its
    /// nearest less-indented uncommented line
    fn nested_indent(&mut self, source_indent: usize, indent_step: usize) -> usize {
        while self
            .frames
            .last()
            .is_some_and(|&(indent, _)| indent >= source_indent)
        {
            self.frames.pop();
        }
        self.frames
            .last()
            .map_or(0, |&(_, target)| target + indent_step)
    }
}

/// Decides which commented lines to uncomment
pub struct UncommentDecider<'m> {
    model: &'m StructureModel,
    indent_step: usize,
    cascade: bool,
}

impl<'m> UncommentDecider<'m> {
    #[must_use]
    pub fn new(model: &'m StructureModel, options: &Options) -> Self {
        Self {
            model,
            indent_step: options.indent_step,
            cascade: options.force_uncomment_cascade,
        }
    }

    /// Decide every line. The result has one entry per input line, in order.
    pub fn decide(
        &self,
        lines: &[TemplateLine],
        diagnostics: &mut Diagnostics,
    ) -> (Vec<DecidedLine>, DecisionStats) {
        let mut stats = DecisionStats::default();
        let mut cascade: Option<Cascade> = None;
        let mut decided = Vec::with_capacity(lines.len());

        for line in lines {
            let original = strip_terminator(&line.raw).to_owned();
            let mut out = DecidedLine {
                line_no: line.line_no,
                text: original.clone(),
                terminator: line.terminator(),
                original,
                uncommented: false,
            };

            if line.classification == Classification::Constraint {
                stats.constraints_seen += 1;
            }

            let mut promoted = false;
            if line.classification != Classification::Empty
                && let Some(open) = cascade.as_ref()
            {
                if line.indent > open.until_indent {
                    promoted = line.commented && line.data.is_some();
                } else {
                    cascade = None;
                }
            }

            let inactive = line.classification == Classification::InactiveData;
            if inactive && (line.resolved_node.is_some() || promoted) {
                let target = match (line.resolved_node, cascade.as_mut()) {
                    (Some(node), open) => {
                        let target = self.model_indent(line, self.model.node(node).depth());
                        if let Some(open) = open {
                            open.nested_indent(line.indent, self.indent_step);
                        }
                        target
                    }
                    (None, Some(open)) => open.nested_indent(line.indent, self.indent_step),
                    (None, None) => 0,
                };

                out.text = format!("{}{}", " ".repeat(target), self.content(line));
                out.uncommented = true;
                stats.uncommented += 1;

                let is_container = line
                    .resolved_node
                    .is_some_and(|node| self.model.node(node).has_children());
                if let Some(open) = cascade.as_mut() {
                    open.frames.push((line.indent, target));
                } else if self.cascade && is_container {
                    cascade = Some(Cascade {
                        until_indent: line.indent,
                        frames: vec![(line.indent, target)],
                    });
                }
            } else if inactive {
                stats.inactive_unmatched += 1;
                diagnostics.debug(
                    "template.inactive-unmatched",
                    Some(line.line_no),
                    format!(
                        "Commented parameter '{}' is not a known parameter",
                        line.inferred_path
                            .as_ref()
                            .map_or_else(String::new, ToString::to_string)
                    ),
                );
            }

            decided.push(out);
        }

        (decided, stats)
    }

    /// Uncommented content. A list item's marker is padded to the indent
    /// step so its key lines up with the element's other keys.
    fn content<'l>(&self, line: &'l TemplateLine) -> Cow<'l, str> {
        let content = line.uncommented_content().trim_start();
        if !line.data.as_ref().is_some_and(|data| data.dash) {
            return Cow::Borrowed(content);
        }
        let rest = content.strip_prefix('-').unwrap_or(content).trim_start();
        let padding = " ".repeat(self.indent_step.saturating_sub(1).max(1));
        Cow::Owned(format!("-{padding}{rest}"))
    }

    /// Indent implied by a node's depth; list items back off one level so
    /// the dash sits where the element's parent puts its children
    fn model_indent(&self, line: &TemplateLine, depth: usize) -> usize {
        let levels = depth.saturating_sub(1);
        let levels = if line.data.as_ref().is_some_and(|data| data.dash) {
            levels.saturating_sub(1)
        } else {
            levels
        };
        levels * self.indent_step
    }
}
