//! Character-level scanner splitting CSV text into fields and records.
//!
//! The scanner is an explicit state machine over one character at a time.
//! Quoting follows the doubled-quote convention: inside a quoted field `""`
//! is a literal quote, and delimiters and newlines are ordinary characters.
//! A quote appearing after an unquoted field has begun is a literal, not a
//! delimiter, so `Milos "MJ" Janjic` stays one field. Unquoted fields are
//! trimmed of surrounding whitespace at emission; fields that began with an
//! opening quote are emitted verbatim.
//!
//! Malformed quoting is never an error: an unterminated quoted field closes
//! at end-of-input with whatever has accumulated. Content-level problems are
//! the schema layer's to report.

use crate::record::{Row, RowAssembler};

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Where the scanner is within the current field.
///
/// Record termination is delivered to the assembler as a signal rather than
/// held as a state; only these four positions survive between characters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    /// Before the first character of a field.
    FieldStart,
    /// Inside a field that did not begin with a quote.
    InUnquotedField,
    /// Inside the quoted section of a field.
    InQuotedField,
    /// Just after a quote character inside a quoted section; the next
    /// character decides between an escaped quote and a closed section.
    QuoteInQuotedField,
}

pub(crate) struct Tokenizer {
    state: State,
    buf: String,
    /// Whether the field under construction began with an opening quote.
    /// Such a field is emitted verbatim even if unquoted characters follow
    /// the closing quote.
    quoted: bool,
}

impl Tokenizer {
    pub(crate) fn new() -> Self {
        Self {
            state: State::FieldStart,
            buf: String::new(),
            quoted: false,
        }
    }

    fn in_quoted_section(&self) -> bool {
        self.state == State::InQuotedField
    }

    /// Closes the field under construction and hands it to the assembler.
    fn emit_field(&mut self, rows: &mut RowAssembler) {
        let raw = std::mem::take(&mut self.buf);
        let value = if self.quoted {
            raw
        } else {
            raw.trim().to_string()
        };
        rows.push_field(value);
        self.quoted = false;
        self.state = State::FieldStart;
    }

    fn end_record(&mut self, rows: &mut RowAssembler) {
        match self.state {
            // A record that never began (blank line) finalizes to nothing.
            State::FieldStart => {
                if rows.row_started() {
                    self.emit_field(rows);
                }
            }
            State::InUnquotedField | State::InQuotedField | State::QuoteInQuotedField => {
                self.emit_field(rows);
            }
        }
        rows.end_record();
    }

    fn step(&mut self, c: char, rows: &mut RowAssembler) {
        match self.state {
            State::FieldStart => match c {
                QUOTE => {
                    self.quoted = true;
                    self.state = State::InQuotedField;
                }
                DELIMITER => rows.push_field(String::new()),
                '\n' => self.end_record(rows),
                _ => {
                    self.buf.push(c);
                    self.state = State::InUnquotedField;
                }
            },
            State::InUnquotedField => match c {
                DELIMITER => self.emit_field(rows),
                '\n' => self.end_record(rows),
                // A quote after the field has begun is an ordinary character.
                _ => self.buf.push(c),
            },
            State::InQuotedField => match c {
                QUOTE => self.state = State::QuoteInQuotedField,
                // Delimiters and newlines included.
                _ => self.buf.push(c),
            },
            State::QuoteInQuotedField => match c {
                QUOTE => {
                    self.buf.push(QUOTE);
                    self.state = State::InQuotedField;
                }
                DELIMITER => self.emit_field(rows),
                '\n' => self.end_record(rows),
                // Quoted section closed; trailing characters continue the
                // same field.
                _ => {
                    self.buf.push(c);
                    self.state = State::InUnquotedField;
                }
            },
        }
    }

    /// Closes whatever is open at end-of-input. An unterminated quoted
    /// field degrades to its accumulated content.
    fn finish(mut self, rows: &mut RowAssembler) {
        if self.state != State::FieldStart || rows.row_started() {
            self.end_record(rows);
        }
    }
}

/// Scans `input` into ordered rows of ordered fields.
///
/// A record ends at an unquoted newline (`\n`, `\r\n`, or a bare `\r`) or at
/// end-of-input. Lines that contribute no field produce no row.
pub(crate) fn scan(input: &str) -> Vec<Row> {
    let mut rows = RowAssembler::new();
    let mut tokenizer = Tokenizer::new();
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' && !tokenizer.in_quoted_section() {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            tokenizer.step('\n', &mut rows);
        } else {
            tokenizer.step(c, &mut rows);
        }
    }
    tokenizer.finish(&mut rows);
    rows.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(input: &str) -> Vec<Vec<String>> {
        scan(input).into_iter().map(Row::into_fields).collect()
    }

    #[test]
    fn plain_fields() {
        assert_eq!(fields("a,b,c"), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn one_row_per_line() {
        assert_eq!(
            fields("name,age\nAlice,23\n"),
            vec![vec!["name", "age"], vec!["Alice", "23"]]
        );
    }

    #[test]
    fn unquoted_fields_are_trimmed() {
        assert_eq!(
            fields(" Zach , Quitkin \n"),
            vec![vec!["Zach", "Quitkin"]]
        );
    }

    #[test]
    fn quoted_field_keeps_whitespace() {
        assert_eq!(fields("\" Zach \",x"), vec![vec![" Zach ", "x"]]);
    }

    #[test]
    fn quoted_field_keeps_delimiters() {
        assert_eq!(
            fields("\"the man, testing comma, comma man\",25"),
            vec![vec!["the man, testing comma, comma man", "25"]]
        );
        assert_eq!(fields("Number,\"1,000\""), vec![vec!["Number", "1,000"]]);
    }

    #[test]
    fn doubled_quote_is_a_literal_quote() {
        assert_eq!(fields("\"a\"\"b\""), vec![vec!["a\"b"]]);
    }

    #[test]
    fn quote_inside_unquoted_field_is_literal() {
        assert_eq!(
            fields("Milos \"MJ\" Janjic,20,CS320"),
            vec![vec!["Milos \"MJ\" Janjic", "20", "CS320"]]
        );
    }

    #[test]
    fn comma_always_delimits_outside_quoted_section() {
        // Quotes opened mid-field do not protect the comma.
        assert_eq!(
            fields("a \"b, c\" d,e"),
            vec![vec!["a \"b", "c\" d", "e"]]
        );
    }

    #[test]
    fn newline_inside_quoted_field_is_literal() {
        assert_eq!(
            fields("\"I am on\ntwo lines\",2022,2020\n"),
            vec![vec!["I am on\ntwo lines", "2022", "2020"]]
        );
    }

    #[test]
    fn empty_fields_between_delimiters() {
        assert_eq!(
            fields("Zach,,CSCI 0320,Student"),
            vec![vec!["Zach", "", "CSCI 0320", "Student"]]
        );
    }

    #[test]
    fn trailing_delimiter_yields_trailing_empty_field() {
        assert_eq!(
            fields("Zach,Quitkin,2023,\n"),
            vec![vec!["Zach", "Quitkin", "2023", ""]]
        );
        assert_eq!(fields(",\n"), vec![vec!["", ""]]);
    }

    #[test]
    fn trailing_characters_after_closing_quote_continue_the_field() {
        assert_eq!(fields("\"a\"b,c"), vec![vec!["ab", "c"]]);
        // The field began quoted, so it is not trimmed.
        assert_eq!(fields("\"a\" ,c"), vec![vec!["a ", "c"]]);
    }

    #[test]
    fn unterminated_quote_closes_at_end_of_input() {
        assert_eq!(fields("\"abc"), vec![vec!["abc"]]);
        assert_eq!(fields("x,\"a,b\nc"), vec![vec!["x", "a,b\nc"]]);
    }

    #[test]
    fn blank_lines_produce_no_row() {
        assert_eq!(fields("a,b\n\nc,d\n"), vec![vec!["a", "b"], vec!["c", "d"]]);
        assert_eq!(fields("\n\n"), Vec::<Vec<String>>::new());
        assert_eq!(fields(""), Vec::<Vec<String>>::new());
    }

    #[test]
    fn trailing_newline_produces_no_extra_row() {
        assert_eq!(fields("a,b\n"), vec![vec!["a", "b"]]);
    }

    #[test]
    fn missing_final_newline_still_closes_the_record() {
        assert_eq!(fields("a,b\nc,d"), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn crlf_terminates_records() {
        assert_eq!(fields("a,b\r\nc,d\r\n"), fields("a,b\nc,d\n"));
        assert_eq!(fields("a,b\rc,d"), fields("a,b\nc,d"));
    }

    #[test]
    fn crlf_inside_quoted_field_is_preserved() {
        assert_eq!(fields("\"a\r\nb\",c"), vec![vec!["a\r\nb", "c"]]);
    }

    #[test]
    fn whitespace_only_unquoted_field_trims_to_empty() {
        assert_eq!(fields("a,   ,b"), vec![vec!["a", "", "b"]]);
    }

    #[test]
    fn rescanning_is_idempotent() {
        let input = "a,\"b\nc\",d\ne,f,g\n";
        assert_eq!(scan(input), scan(input));
    }
}
