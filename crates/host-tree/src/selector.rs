//! Structural query language understood by the in-memory host.
//!
//! A CSS subset: type and universal selectors, `#id`, `.class`, attribute
//! selectors (`[a]`, `[a=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`, `[a~=v]`), compound
//! selectors, descendant and child combinators, and comma-separated lists.
//! Everything else is rejected as malformed so callers see the same failure
//! mode a browser `querySelector` raises.

use crate::errors::HostError;

/// Element view required to evaluate a selector.
pub trait SelectorTarget: Sized {
    fn tag_name(&self) -> &str;
    fn attribute(&self, name: &str) -> Option<String>;
    fn has_class(&self, class: &str) -> bool;
    /// Parent element; `None` at the top of the element tree.
    fn parent_element(&self) -> Option<Self>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    pub fn parse(source: &str) -> Result<Self, HostError> {
        Parser::new(source).parse_list()
    }

    pub fn matches<T: SelectorTarget>(&self, element: &T) -> bool {
        self.selectors.iter().any(|selector| selector.matches(element))
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// Stored right to left: the subject first, then each ancestor step.
#[derive(Clone, Debug, PartialEq)]
struct ComplexSelector {
    subject: Compound,
    ancestors: Vec<(Combinator, Compound)>,
}

impl ComplexSelector {
    fn matches<T: SelectorTarget>(&self, element: &T) -> bool {
        self.subject.matches(element) && self.match_ancestors(element, 0)
    }

    fn match_ancestors<T: SelectorTarget>(&self, element: &T, step: usize) -> bool {
        let Some((combinator, compound)) = self.ancestors.get(step) else {
            return true;
        };
        match combinator {
            Combinator::Child => match element.parent_element() {
                Some(parent) => compound.matches(&parent) && self.match_ancestors(&parent, step + 1),
                None => false,
            },
            Combinator::Descendant => {
                let mut current = element.parent_element();
                while let Some(ancestor) = current {
                    if compound.matches(&ancestor) && self.match_ancestors(&ancestor, step + 1) {
                        return true;
                    }
                    current = ancestor.parent_element();
                }
                false
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeSelector>,
}

impl Compound {
    fn matches<T: SelectorTarget>(&self, element: &T) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag_name().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attribute("id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }
        self.attributes
            .iter()
            .all(|attr| attr.matches(element.attribute(&attr.name).as_deref()))
    }
}

#[derive(Clone, Debug, PartialEq)]
enum AttributeOp {
    Exists,
    Equals(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
    Word(String),
}

#[derive(Clone, Debug, PartialEq)]
struct AttributeSelector {
    name: String,
    op: AttributeOp,
}

impl AttributeSelector {
    fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &self.op {
            AttributeOp::Exists => true,
            AttributeOp::Equals(expected) => value == expected,
            AttributeOp::Prefix(prefix) => !prefix.is_empty() && value.starts_with(prefix.as_str()),
            AttributeOp::Suffix(suffix) => !suffix.is_empty() && value.ends_with(suffix.as_str()),
            AttributeOp::Contains(part) => !part.is_empty() && value.contains(part.as_str()),
            AttributeOp::Word(word) => value.split_whitespace().any(|w| w == word),
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> HostError {
        HostError::invalid_selector(self.source, reason)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(&mut self) -> Result<SelectorList, HostError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek().is_none() {
                return Err(self.error(if selectors.is_empty() {
                    "empty selector"
                } else {
                    "trailing comma"
                }));
            }
            selectors.push(self.parse_complex()?);
            match self.peek() {
                None => break,
                Some(',') => {
                    self.bump();
                }
                Some(other) => {
                    return Err(self.error(format!("unexpected '{}' at {}", other, self.pos)))
                }
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, HostError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.bump();
                    self.skip_whitespace();
                    combinators.push(Combinator::Child);
                    compounds.push(self.parse_compound()?);
                }
                Some('+') | Some('~') => {
                    return Err(self.error("sibling combinators are not supported"))
                }
                Some(_) if had_space => {
                    combinators.push(Combinator::Descendant);
                    compounds.push(self.parse_compound()?);
                }
                Some(other) => {
                    return Err(self.error(format!("unexpected '{}' at {}", other, self.pos)))
                }
            }
        }

        let subject = compounds.pop().ok_or_else(|| self.error("expected selector"))?;
        let ancestors = combinators.into_iter().rev().zip(compounds.into_iter().rev()).collect();
        Ok(ComplexSelector { subject, ancestors })
    }

    fn parse_compound(&mut self) -> Result<Compound, HostError> {
        let mut compound = Compound::default();
        let mut seen_any = false;

        match self.peek() {
            Some('*') => {
                self.bump();
                seen_any = true;
            }
            Some(c) if is_ident_start(c) => {
                compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
                seen_any = true;
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.id = Some(self.parse_ident()?);
                }
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.bump();
                    compound.attributes.push(self.parse_attribute()?);
                }
                Some(':') => return Err(self.error("pseudo-classes are not supported")),
                _ => break,
            }
            seen_any = true;
        }

        if !seen_any {
            return Err(match self.peek() {
                Some(other) => self.error(format!("expected selector, found '{}'", other)),
                None => self.error("expected selector after combinator"),
            });
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String, HostError> {
        match self.peek() {
            Some(c) if is_ident_start(c) => {}
            Some(c) => return Err(self.error(format!("invalid identifier start '{}'", c))),
            None => return Err(self.error("unexpected end of selector")),
        }
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_ident_char(c)) {
            self.pos += 1;
        }
        let ident: String = self.chars[start..self.pos].iter().collect();
        if ident == "-" || ident == "--" {
            return Err(self.error("identifier cannot be a bare hyphen"));
        }
        if ident.starts_with('-') && ident[1..].starts_with(|c: char| c.is_ascii_digit()) {
            return Err(self.error("identifier cannot start with a digit"));
        }
        Ok(ident)
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, HostError> {
        self.skip_whitespace();
        let name = self.parse_ident()?;
        self.skip_whitespace();

        let op = match self.bump() {
            Some(']') => return Ok(AttributeSelector { name, op: AttributeOp::Exists }),
            Some('=') => "=",
            Some(c @ ('^' | '$' | '*' | '~')) => {
                if self.bump() != Some('=') {
                    return Err(self.error(format!("expected '=' after '{}'", c)));
                }
                match c {
                    '^' => "^=",
                    '$' => "$=",
                    '*' => "*=",
                    _ => "~=",
                }
            }
            Some(other) => {
                return Err(self.error(format!("unexpected '{}' in attribute selector", other)))
            }
            None => return Err(self.error("unterminated attribute selector")),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c != quote) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(self.error("unterminated string"));
                }
                let value: String = self.chars[start..self.pos].iter().collect();
                self.bump();
                value
            }
            _ => self.parse_ident()?,
        };
        self.skip_whitespace();
        if self.bump() != Some(']') {
            return Err(self.error("unterminated attribute selector"));
        }

        let op = match op {
            "=" => AttributeOp::Equals(value),
            "^=" => AttributeOp::Prefix(value),
            "$=" => AttributeOp::Suffix(value),
            "*=" => AttributeOp::Contains(value),
            _ => AttributeOp::Word(value),
        };
        Ok(AttributeSelector { name, op })
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}
