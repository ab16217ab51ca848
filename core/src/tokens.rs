//! Splitting of field signatures.
//!
//! A signature such as `"Expr left, Token operator, Expr right"` is read as a
//! sequence of tokens separated by commas and spaces. Tokens are borrowed from
//! the signature, so scanning never copies or mutates it.

use std::iter::FusedIterator;

use crate::{descriptor::FieldPair, error::SignatureError};

const DELIMITERS: [char; 2] = [',', ' '];

fn is_delimiter(c: char) -> bool {
    DELIMITERS.contains(&c)
}

/// Tokens of a signature, left to right. Runs of delimiters count as one.
pub fn tokens(signature: &str) -> Tokens<'_> {
    Tokens { rest: signature }
}

/// Field pairs of a signature, left to right.
pub fn fields(signature: &str) -> Fields<'_> {
    Fields {
        tokens: tokens(signature),
        position: 0,
        done: false,
    }
}

#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest.trim_start_matches(is_delimiter);
        let end = rest.find(is_delimiter).unwrap_or(rest.len());
        let (token, tail) = rest.split_at(end);
        self.rest = tail;

        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }
}

impl FusedIterator for Tokens<'_> {}

/// Pairs up tokens as `(type, name)`.
///
/// A type token with nothing after it yields a single
/// [`SignatureError::MissingFieldName`], after which the iterator is exhausted.
#[derive(Debug, Clone)]
pub struct Fields<'a> {
    tokens: Tokens<'a>,
    position: usize,
    done: bool,
}

impl<'a> Iterator for Fields<'a> {
    type Item = Result<FieldPair<'a>, SignatureError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let Some(type_name) = self.tokens.next() else {
            self.done = true;
            return None;
        };

        self.position += 1;
        match self.tokens.next() {
            Some(field_name) => Some(Ok(FieldPair::new(type_name, field_name))),
            None => {
                self.done = true;
                Some(Err(SignatureError::MissingFieldName {
                    type_name: type_name.to_string(),
                    position: self.position,
                }))
            }
        }
    }
}

impl FusedIterator for Fields<'_> {}
