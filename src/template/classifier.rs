//! Line classification and parameter path inference
//!
//! A single forward pass over the template. Data lines (active or
//! commented) get a parameter path from an indentation stack; when the
//! indentation parent does not know the key, the stack is searched for the
//! nearest frame that does, since commented blocks rarely keep the
//! surrounding indentation.

use crate::config::Options;
use crate::diagnostics::Diagnostics;
use crate::keypath::{ParamPath, Token, Wrap};
use crate::model::structure::{NodeId, StructureModel};
use crate::template::line::{
    Classification, DataLine, TemplateLine, content_indent, leading_width, split_lines,
    strip_terminator, uncomment,
};
use anyhow::{Context as _, Result};
use regex::Regex;

/// `[- ]KEY:[ value]` where KEY is quoted, parenthesised, a placeholder or plain
const DATA_PATTERN: &str = r##"^(?P<dash>-[ \t]+)?(?P<key>"(?:[^"\\]|\\.)*"|'(?:[^']|'')*'|\([^)]*\)|\{\{.*?\}\}|[^\s:#"'(\[\]{}\-][^\s:]*(?::[^\s:]+)*)[ \t]*:(?:[ \t]+(?P<value>.*?))?[ \t]*$"##;

/// Confidence attached to commented lines kept as data only by heuristics
const HEURISTIC_CONFIDENCE: f64 = 0.5;

/// Ephemeral frame of the inference stack
#[derive(Debug, Clone)]
struct StackFrame {
    indent: usize,
    path: ParamPath,
    node: Option<NodeId>,
}

/// Outcome of path inference for one data line
#[derive(Debug)]
struct Inference {
    /// Number of stack frames kept below the new ones
    keep: usize,
    element: Option<(ParamPath, Option<NodeId>)>,
    path: ParamPath,
    node: Option<NodeId>,
}

/// Classifies template lines against a structure model
pub struct TemplateClassifier<'m> {
    model: &'m StructureModel,
    tab_size: usize,
    constraint_keywords: Vec<String>,
    heuristic_key_length: usize,
    data_pattern: Regex,
}

impl<'m> TemplateClassifier<'m> {
    /// Create a classifier reading `model`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The data line pattern fails to compile
    pub fn new(model: &'m StructureModel, options: &Options) -> Result<Self> {
        let data_pattern = Regex::new(DATA_PATTERN).context("Failed to compile data line pattern")?;
        Ok(Self {
            model,
            tab_size: options.tab_size,
            constraint_keywords: options
                .constraint_keywords
                .iter()
                .map(|keyword| keyword.to_lowercase())
                .collect(),
            heuristic_key_length: options.heuristic_key_length,
            data_pattern,
        })
    }

    /// Match `content` against the data pattern
    #[must_use]
    pub fn parse_data(&self, content: &str) -> Option<DataLine> {
        let captures = self.data_pattern.captures(content)?;
        let dash = captures.name("dash");
        let raw_key = captures.name("key")?.as_str();
        let (key, key_token) = key_token(raw_key);

        Some(DataLine {
            dash: dash.is_some(),
            dash_width: dash.map_or(0, |m| leading_width(m.as_str().trim_start_matches('-'), self.tab_size) + 1),
            key,
            key_token,
            value: captures
                .name("value")
                .map(|m| m.as_str().to_owned())
                .filter(|value| !value.is_empty()),
        })
    }

    /// Classify every line of `text`
    pub fn classify(&self, text: &str, diagnostics: &mut Diagnostics) -> Vec<TemplateLine> {
        let mut stack: Vec<StackFrame> = Vec::new();
        let mut block_scalar: Option<usize> = None;

        split_lines(text)
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                self.classify_line(raw, index + 1, &mut stack, &mut block_scalar, diagnostics)
            })
            .collect()
    }

    fn classify_line(
        &self,
        raw: &str,
        line_no: usize,
        stack: &mut Vec<StackFrame>,
        block_scalar: &mut Option<usize>,
        diagnostics: &mut Diagnostics,
    ) -> TemplateLine {
        let mut line = TemplateLine {
            raw: raw.to_owned(),
            line_no,
            indent: 0,
            commented: false,
            classification: Classification::Empty,
            data: None,
            inferred_path: None,
            resolved_node: None,
            confidence: 1.0,
        };

        let body = strip_terminator(raw);
        if body.trim().is_empty() {
            return line;
        }
        line.indent = content_indent(body, self.tab_size);
        line.commented = body.trim_start().starts_with('#');

        let physical_indent = leading_width(body, self.tab_size);
        let in_block = match *block_scalar {
            Some(block_indent) if physical_indent > block_indent => true,
            _ => {
                *block_scalar = None;
                false
            }
        };

        let content = if line.commented {
            uncomment(body).trim_start()
        } else {
            body.trim_start()
        };
        let data = self.parse_data(content);

        match (line.commented, data) {
            (false, None) => line.classification = Classification::Documentation,
            (true, None) => {
                let lowered = body.trim().to_lowercase();
                line.classification = if self
                    .constraint_keywords
                    .iter()
                    .any(|keyword| lowered.contains(keyword.as_str()))
                {
                    Classification::Constraint
                } else {
                    Classification::Documentation
                };
            }
            (false, Some(data)) => {
                line.classification = Classification::ActiveData;
                if !in_block {
                    let inference = self.infer(stack, line.indent, &data, false);
                    apply(stack, &inference, line.indent, &data);
                    line.inferred_path = Some(inference.path);
                    line.resolved_node = inference.node;
                    if data.opens_block_scalar() {
                        *block_scalar = Some(physical_indent);
                    }
                }
                line.data = Some(data);
            }
            (true, Some(data)) => {
                if in_block {
                    line.classification = Classification::Documentation;
                    return line;
                }
                let inference = self.infer(stack, line.indent, &data, true);
                let resolved = inference.node.is_some();
                let short_key = data.key.chars().count() < self.heuristic_key_length;

                if resolved || short_key || data.has_placeholder_value() {
                    line.classification = Classification::InactiveData;
                    if !resolved {
                        line.confidence = HEURISTIC_CONFIDENCE;
                    }
                    apply(stack, &inference, line.indent, &data);
                    line.inferred_path = Some(inference.path);
                    line.resolved_node = inference.node;
                    line.data = Some(data);
                } else {
                    line.classification = Classification::Documentation;
                    diagnostics.debug(
                        "template.ambiguous",
                        Some(line_no),
                        format!("Commented key '{}' is unknown and too long to be a parameter", data.key),
                    );
                }
            }
        }
        line
    }

    /// Infer the path of a data line. The indentation parent is tried
    /// first, then the remaining frames from the top of the stack down to
    /// the root. Commented lines may also attach to frames that indentation
    /// alone would have popped.
    fn infer(&self, stack: &[StackFrame], indent: usize, data: &DataLine, commented: bool) -> Inference {
        let popped_len = stack
            .iter()
            .rposition(|frame| frame.indent < indent)
            .map_or(0, |position| position + 1);

        let searchable = if commented { stack.len() } else { popped_len };
        let mut candidates = vec![popped_len];
        candidates.extend((0..=searchable).rev().filter(|&keep| keep != popped_len));

        for keep in candidates {
            let base = self.base_node(stack, keep);
            let Some(base) = base else {
                continue;
            };
            if let Some((element, node)) = self.lookup(base, data) {
                return self.inference(stack, keep, data, element, Some(node));
            }
        }

        let element = self
            .base_node(stack, popped_len)
            .filter(|_| data.dash)
            .and_then(|base| self.model.step(base, &Token::index()));
        self.inference(stack, popped_len, data, element, None)
    }

    /// Node the frames `stack[..keep]` point at; the root for `keep == 0`
    fn base_node(&self, stack: &[StackFrame], keep: usize) -> Option<NodeId> {
        match keep.checked_sub(1) {
            Some(top) => stack[top].node,
            None => Some(self.model.root()),
        }
    }

    /// Resolve the key (through `[N]` for list items) below `base`
    fn lookup(&self, base: NodeId, data: &DataLine) -> Option<(Option<NodeId>, NodeId)> {
        if data.dash {
            let element = self.model.step(base, &Token::index())?;
            let node = self.model.step(element, &data.key_token)?;
            Some((Some(element), node))
        } else {
            let node = self.model.step(base, &data.key_token)?;
            Some((None, node))
        }
    }

    fn inference(
        &self,
        stack: &[StackFrame],
        keep: usize,
        data: &DataLine,
        element_node: Option<NodeId>,
        node: Option<NodeId>,
    ) -> Inference {
        let base_path = keep
            .checked_sub(1)
            .map_or_else(ParamPath::root, |top| stack[top].path.clone());

        let (element, parent_path) = if data.dash {
            let element_path = base_path.child(Token::index());
            (Some((element_path.clone(), element_node)), element_path)
        } else {
            (None, base_path)
        };

        Inference {
            keep,
            element,
            path: parent_path.child(data.key_token.clone()),
            node,
        }
    }
}

fn apply(stack: &mut Vec<StackFrame>, inference: &Inference, indent: usize, data: &DataLine) {
    stack.truncate(inference.keep);
    if let Some((path, node)) = inference.element.as_ref() {
        stack.push(StackFrame {
            indent,
            path: path.clone(),
            node: *node,
        });
    }
    stack.push(StackFrame {
        indent: indent + data.dash_width,
        path: inference.path.clone(),
        node: inference.node,
    });
}

/// Split a matched key into its bare text and path token
fn key_token(raw_key: &str) -> (String, Token) {
    if let Some(inner) = raw_key.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        let key = inner.replace("\\\"", "\"").replace("\\\\", "\\");
        let token = Token::special(&key, Wrap::DoubleQuote);
        return (key, token);
    }
    if let Some(inner) = raw_key.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')) {
        let key = inner.replace("''", "'");
        let token = Token::special(&key, Wrap::SingleQuote);
        return (key, token);
    }
    if let Some(inner) = raw_key.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        return (inner.to_owned(), Token::special(inner, Wrap::Paren));
    }
    (raw_key.to_owned(), Token::from_key(raw_key))
}
