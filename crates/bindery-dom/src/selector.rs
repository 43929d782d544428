//! CSS selector subset
//!
//! Supports selector groups (`,`), compound selectors built from
//! `tag`, `*`, `#id`, `.class` and attribute conditions, and the
//! descendant (` `) and child (`>`) combinators. Pseudo-classes are rejected.

use crate::{DomTree, NodeId};

/// Selector parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character {ch:?} in selector {selector:?}")]
    UnexpectedChar { ch: char, selector: String },
    #[error("unsupported selector syntax {0:?}")]
    Unsupported(String),
    #[error("unterminated attribute selector in {0:?}")]
    UnterminatedAttribute(String),
    #[error("dangling combinator in {0:?}")]
    DanglingCombinator(String),
}

/// Parsed selector list
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    groups: Vec<Complex>,
}

#[derive(Debug, Clone, PartialEq)]
struct Complex {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    /// None matches any tag
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

#[derive(Debug, Clone, PartialEq)]
struct AttrCondition {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, PartialEq)]
enum AttrOp {
    Exists,
    Equals(String),
    Includes(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

impl Selector {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }
        let groups = split_groups(trimmed)?
            .into_iter()
            .map(|group| Parser::new(group, input).parse_complex())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { groups })
    }

    /// Whether `node` matches any selector in the list
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        tree.is_element(node)
            && self
                .groups
                .iter()
                .any(|c| match_from(tree, node, c, c.compounds.len() - 1))
    }
}

fn match_from(tree: &DomTree, node: NodeId, complex: &Complex, idx: usize) -> bool {
    if !complex.compounds[idx].matches(tree, node) {
        return false;
    }
    if idx == 0 {
        return true;
    }
    match complex.combinators[idx - 1] {
        Combinator::Child => tree
            .parent(node)
            .filter(|&p| tree.is_element(p))
            .is_some_and(|p| match_from(tree, p, complex, idx - 1)),
        Combinator::Descendant => tree
            .ancestors(node)
            .filter(|&a| tree.is_element(a))
            .any(|a| match_from(tree, a, complex, idx - 1)),
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(el) = tree.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if &el.tag != tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.id() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| el.classes().any(|have| have == c)) {
            return false;
        }
        self.attrs.iter().all(|cond| {
            let Some(value) = el.get_attr(&cond.name) else {
                return false;
            };
            match &cond.op {
                AttrOp::Exists => true,
                AttrOp::Equals(v) => value == v,
                AttrOp::Includes(v) => value.split_whitespace().any(|t| t == v),
                AttrOp::Prefix(v) => !v.is_empty() && value.starts_with(v.as_str()),
                AttrOp::Suffix(v) => !v.is_empty() && value.ends_with(v.as_str()),
                AttrOp::Substring(v) => !v.is_empty() && value.contains(v.as_str()),
            }
        })
    }
}

/// Split on top-level commas (outside brackets and quotes)
fn split_groups(input: &str) -> Result<Vec<&str>, SelectorError> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                groups.push(input[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    groups.push(input[start..].trim());
    if groups.iter().any(|g| g.is_empty()) {
        return Err(SelectorError::Empty);
    }
    Ok(groups)
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn new(group: &str, source: &'a str) -> Self {
        Self {
            chars: group.chars().collect(),
            pos: 0,
            source,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn unexpected(&self, ch: char) -> SelectorError {
        SelectorError::UnexpectedChar {
            ch,
            selector: self.source.to_string(),
        }
    }

    fn unterminated(&self) -> SelectorError {
        SelectorError::UnterminatedAttribute(self.source.to_string())
    }

    fn parse_complex(&mut self) -> Result<Complex, SelectorError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(self.unexpected(c)),
            };
            if self.peek().is_none() {
                return Err(SelectorError::DanglingCombinator(self.source.to_string()));
            }
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }
        Ok(Complex {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut universal = false;
        while let Some(c) = self.peek() {
            match c {
                '*' if compound.is_empty() && !universal => {
                    self.pos += 1;
                    universal = true;
                }
                '#' => {
                    self.pos += 1;
                    compound.id = Some(self.parse_ident()?);
                }
                '.' => {
                    self.pos += 1;
                    let class = self.parse_ident()?;
                    compound.classes.push(class);
                }
                '[' => {
                    self.pos += 1;
                    let cond = self.parse_attr()?;
                    compound.attrs.push(cond);
                }
                ':' => {
                    let rest: String = self.chars[self.pos..].iter().collect();
                    return Err(SelectorError::Unsupported(rest));
                }
                c if c.is_whitespace() || c == '>' => break,
                c if is_ident_char(c) && compound.is_empty() && !universal => {
                    compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
                }
                c => return Err(self.unexpected(c)),
            }
        }
        if compound.is_empty() && !universal {
            return match self.peek() {
                Some(c) => Err(self.unexpected(c)),
                None => Err(SelectorError::DanglingCombinator(self.source.to_string())),
            };
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => SelectorError::Unsupported(self.source.to_string()),
            });
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_attr(&mut self) -> Result<AttrCondition, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let op_char = self.peek().ok_or_else(|| self.unterminated())?;
        if op_char == ']' {
            self.pos += 1;
            return Ok(AttrCondition {
                name,
                op: AttrOp::Exists,
            });
        }
        let kind = match op_char {
            '=' => {
                self.pos += 1;
                '='
            }
            '~' | '^' | '$' | '*' => {
                self.pos += 1;
                if self.peek() != Some('=') {
                    return Err(self.unexpected(op_char));
                }
                self.pos += 1;
                op_char
            }
            c => return Err(self.unexpected(c)),
        };
        self.skip_whitespace();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != q) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(self.unterminated());
                }
                let value: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                value
            }
            Some(_) => self.parse_ident()?,
            None => return Err(self.unterminated()),
        };
        self.skip_whitespace();
        if self.peek() != Some(']') {
            return Err(self.unterminated());
        }
        self.pos += 1;
        let op = match kind {
            '=' => AttrOp::Equals(value),
            '~' => AttrOp::Includes(value),
            '^' => AttrOp::Prefix(value),
            '$' => AttrOp::Suffix(value),
            _ => AttrOp::Substring(value),
        };
        Ok(AttrCondition { name, op })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}
