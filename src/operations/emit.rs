//! Document emission

use crate::operations::uncomment::DecidedLine;

/// Concatenate decided lines, each with its own terminator. Non-empty
/// output always ends with a newline.
#[must_use]
pub fn emit(lines: &[DecidedLine]) -> String {
    let capacity = lines.iter().map(|line| line.text.len() + 2).sum();
    let mut document = String::with_capacity(capacity);
    for line in lines {
        document.push_str(&line.text);
        document.push_str(line.terminator);
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, terminator: &'static str) -> DecidedLine {
        DecidedLine {
            line_no: 1,
            text: text.to_owned(),
            terminator,
            original: text.to_owned(),
            uncommented: false,
        }
    }

    #[test]
    fn keeps_terminators() {
        let lines = [line("a: 1", "\r\n"), line("b: 2", "\n")];
        assert_eq!(emit(&lines), "a: 1\r\nb: 2\n");
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert_eq!(emit(&[]), "");
    }
}
