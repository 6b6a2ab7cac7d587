//! CSS selector subset.
//!
//! Parsing produces a [`Selector`]; matching walks ancestors right to left
//! through a [`MatchContext`] so the tree storage stays private to the
//! document.

use std::fmt;
use std::str::FromStr;

use indextree::NodeId;

use crate::error::SelectorError;

/// A parsed selector list (`a, b > c`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    /// Compounds left to right; each carries the combinator to its left.
    parts: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Id(String),
    Class(String),
    HasAttr(String),
    AttrEquals(String, String),
    Checked,
    Disabled,
    Not(Box<Compound>),
}

/// Read access to the tree during matching.
pub(crate) trait MatchContext {
    fn tag_of(&self, node: NodeId) -> Option<&str>;
    fn attr_of(&self, node: NodeId, name: &str) -> Option<&str>;
    fn parent_of(&self, node: NodeId) -> Option<NodeId>;
    fn checked(&self, node: NodeId) -> bool;
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser::new(source);
        let alternatives = parser.selector_list()?;
        Ok(Self {
            source: source.trim().to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub(crate) fn matches(&self, ctx: &impl MatchContext, node: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|complex| matches_complex(ctx, node, &complex.parts))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn matches_complex(ctx: &impl MatchContext, node: NodeId, parts: &[(Combinator, Compound)]) -> bool {
    let Some(((combinator, last), rest)) = parts.split_last() else {
        return false;
    };
    if !matches_compound(ctx, node, last) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }

    match combinator {
        Combinator::Child => ctx
            .parent_of(node)
            .is_some_and(|parent| matches_complex(ctx, parent, rest)),
        Combinator::Descendant => {
            let mut current = ctx.parent_of(node);
            while let Some(ancestor) = current {
                if matches_complex(ctx, ancestor, rest) {
                    return true;
                }
                current = ctx.parent_of(ancestor);
            }
            false
        }
    }
}

fn matches_compound(ctx: &impl MatchContext, node: NodeId, compound: &Compound) -> bool {
    let Some(tag) = ctx.tag_of(node) else {
        return false;
    };
    if let Some(expected) = &compound.tag {
        if expected != tag {
            return false;
        }
    }

    compound.conditions.iter().all(|condition| match condition {
        Condition::Id(id) => ctx.attr_of(node, "id") == Some(id.as_str()),
        Condition::Class(class) => ctx
            .attr_of(node, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class)),
        Condition::HasAttr(name) => ctx.attr_of(node, name).is_some(),
        Condition::AttrEquals(name, value) => ctx.attr_of(node, name) == Some(value.as_str()),
        Condition::Checked => ctx.checked(node),
        Condition::Disabled => ctx.attr_of(node, "disabled").is_some(),
        Condition::Not(inner) => !matches_compound(ctx, node, inner),
    })
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(found) => SelectorError::Unexpected {
                found,
                position: self.pos,
            },
            None => SelectorError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn selector_list(&mut self) -> Result<Vec<Complex>, SelectorError> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Err(SelectorError::Empty);
        }

        let mut alternatives = vec![self.complex()?];
        while self.peek() == Some(',') {
            self.pos += 1;
            self.skip_whitespace();
            alternatives.push(self.complex()?);
        }
        if self.peek().is_some() {
            return Err(self.unexpected());
        }
        Ok(alternatives)
    }

    fn complex(&mut self) -> Result<Complex, SelectorError> {
        let mut parts = vec![(Combinator::Descendant, self.compound()?)];
        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(_) if had_space => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            parts.push((combinator, self.compound()?));
        }
        Ok(Complex { parts })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut universal = false;
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                universal = true;
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.conditions.push(Condition::Id(self.ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    compound.conditions.push(Condition::Class(self.ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    compound.conditions.push(self.attribute()?);
                }
                Some(':') => {
                    self.pos += 1;
                    compound.conditions.push(self.pseudo()?);
                }
                _ => break,
            }
        }

        if !universal && compound.tag.is_none() && compound.conditions.is_empty() {
            return Err(self.unexpected());
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<Condition, SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();
        match self.bump() {
            Some(']') => Ok(Condition::HasAttr(name)),
            Some('=') => {
                self.skip_whitespace();
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => {
                        self.pos += 1;
                        let mut value = String::new();
                        loop {
                            match self.bump() {
                                Some(c) if c == quote => break,
                                Some(c) => value.push(c),
                                None => return Err(SelectorError::UnexpectedEnd),
                            }
                        }
                        value
                    }
                    _ => self.ident()?,
                };
                self.skip_whitespace();
                self.expect(']')?;
                Ok(Condition::AttrEquals(name, value))
            }
            Some(found) => Err(SelectorError::Unexpected {
                found,
                position: self.pos - 1,
            }),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    fn pseudo(&mut self) -> Result<Condition, SelectorError> {
        let name = self.ident()?;
        match name.as_str() {
            "checked" => Ok(Condition::Checked),
            "disabled" => Ok(Condition::Disabled),
            "not" => {
                self.expect('(')?;
                self.skip_whitespace();
                let inner = self.compound()?;
                self.skip_whitespace();
                self.expect(')')?;
                Ok(Condition::Not(Box::new(inner)))
            }
            _ => Err(SelectorError::UnsupportedPseudo(name)),
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.unexpected());
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
