//! Recursive-descent parser for the program subset the plan compiler emits:
//! function declarations whose body is a single `return` of a JSX tree or a
//! literal. Anything outside that subset is a transform error.

use serde_json::Value;

use super::text::{clean_jsx_text, decode_entities};
use super::RenderError;

/// Deepest JSX or parenthesis nesting a program may use
pub(crate) const MAX_DEPTH: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Program {
    pub functions: Vec<Function>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Function {
    pub name: String,
    pub params: Vec<String>,
    /// The returned expression; `None` for a bare `return` or an empty body
    pub body: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Element(Element),
    Fragment(Vec<Child>),
    Literal(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Element {
    pub tag: String,
    pub attributes: Vec<(String, Value)>,
    pub children: Vec<Child>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Child {
    Text(String),
    Expr(Expr),
}

pub(crate) fn parse_program(src: &str) -> Result<Program, RenderError> {
    Parser { src, pos: 0, depth: 0 }.program()
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, s: &str) -> Result<(), RenderError> {
        if self.eat(s) {
            Ok(())
        } else {
            Err(self.error(format!("Expected \"{}\"", s)))
        }
    }

    /// Consume `word` only when it is not the prefix of a longer identifier
    fn keyword(&mut self, word: &str) -> bool {
        if !self.starts_with(word) {
            return false;
        }
        let follows_ident = self.rest()[word.len()..].chars().next().map_or(false, is_ident_char);
        if follows_ident {
            return false;
        }
        self.pos += word.len();
        true
    }

    fn error(&self, message: impl Into<String>) -> RenderError {
        let before = &self.src[..self.pos];
        let line = before.matches('\n').count() + 1;
        let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        RenderError::Transform(format!("{} ({}:{})", message.into(), line, column))
    }

    fn enter(&mut self) -> Result<(), RenderError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("Maximum nesting depth exceeded"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Skip whitespace and comments
    fn skip_trivia(&mut self) -> Result<(), RenderError> {
        loop {
            self.skip_whitespace();
            if self.starts_with("//") {
                self.pos += self.rest().find('\n').unwrap_or(self.rest().len());
            } else if self.starts_with("/*") {
                match self.rest()[2..].find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => return Err(self.error("Unterminated comment")),
                }
            } else {
                return Ok(());
            }
        }
    }

    fn identifier(&mut self) -> Option<&'a str> {
        self.name_with(is_ident_char)
    }

    /// A name starting like an identifier and continuing with `continues`
    fn name_with(&mut self, continues: fn(char) -> bool) -> Option<&'a str> {
        let rest = self.rest();
        let mut end = 0;
        for (i, c) in rest.char_indices() {
            let accepted = if i == 0 { is_ident_start(c) } else { continues(c) };
            if !accepted {
                break;
            }
            end = i + c.len_utf8();
        }
        if end == 0 {
            return None;
        }
        self.pos += end;
        Some(&rest[..end])
    }

    fn program(mut self) -> Result<Program, RenderError> {
        let mut functions = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.at_end() {
                return Ok(Program { functions });
            }
            if self.eat(";") {
                continue;
            }
            if self.keyword("function") {
                functions.push(self.function()?);
                continue;
            }
            return Err(self.error("Unexpected token"));
        }
    }

    fn function(&mut self) -> Result<Function, RenderError> {
        self.skip_trivia()?;
        let name = self
            .identifier()
            .ok_or_else(|| self.error("Expected function name"))?
            .to_string();

        self.skip_trivia()?;
        self.expect("(")?;
        let mut params = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat(")") {
                break;
            }
            if !params.is_empty() {
                self.expect(",")?;
                self.skip_trivia()?;
            }
            let param = self.identifier().ok_or_else(|| self.error("Expected parameter name"))?;
            params.push(param.to_string());
        }

        self.skip_trivia()?;
        self.expect("{")?;
        self.skip_trivia()?;
        let mut body = None;
        if self.keyword("return") {
            self.skip_trivia()?;
            if !self.starts_with(";") && !self.starts_with("}") {
                body = Some(self.expression()?);
            }
            self.skip_trivia()?;
            self.eat(";");
            self.skip_trivia()?;
        }
        if !self.eat("}") {
            return Err(self.error("Unsupported statement in function body"));
        }

        Ok(Function { name, params, body })
    }

    fn expression(&mut self) -> Result<Expr, RenderError> {
        self.skip_trivia()?;
        if self.eat("(") {
            self.enter()?;
            let expr = self.expression()?;
            self.skip_trivia()?;
            self.expect(")")?;
            self.leave();
            return Ok(expr);
        }
        if self.starts_with("<") {
            return self.jsx();
        }
        self.literal().map(Expr::Literal)
    }

    /// A JSON-compatible literal
    fn literal(&mut self) -> Result<Value, RenderError> {
        for (word, value) in [("null", Value::Null), ("true", Value::Bool(true)), ("false", Value::Bool(false))] {
            if self.keyword(word) {
                return Ok(value);
            }
        }

        let rest = self.rest();
        if rest.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
            let end = rest
                .find(|c: char| !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')))
                .unwrap_or(rest.len());
            let value = serde_json::from_str::<Value>(&rest[..end]).map_err(|_| self.error("Invalid number"))?;
            self.pos += end;
            return Ok(value);
        }

        if rest.starts_with(|c: char| matches!(c, '"' | '[' | '{')) {
            let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
            return match stream.next() {
                Some(Ok(value)) => {
                    self.pos += stream.byte_offset();
                    Ok(value)
                }
                Some(Err(e)) => Err(self.error(format!("Invalid literal: {}", e))),
                None => Err(self.error("Expected literal")),
            };
        }

        Err(self.error("Unsupported expression"))
    }

    fn jsx(&mut self) -> Result<Expr, RenderError> {
        self.enter()?;
        self.expect("<")?;
        self.skip_whitespace();

        if self.eat(">") {
            let children = self.children(None)?;
            self.leave();
            return Ok(Expr::Fragment(children));
        }

        let tag = self.tag_name()?;
        let mut attributes = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat("/>") {
                self.leave();
                return Ok(Expr::Element(Element {
                    tag,
                    attributes,
                    children: Vec::new(),
                }));
            }
            if self.eat(">") {
                break;
            }
            if self.starts_with("{") {
                return Err(self.error("Spread attributes are not supported"));
            }

            let name = self
                .name_with(|c| is_ident_char(c) || c == '-' || c == ':')
                .ok_or_else(|| self.error("Expected attribute name"))?
                .to_string();
            self.skip_trivia()?;
            let value = if self.eat("=") {
                self.skip_trivia()?;
                self.attribute_value()?
            } else {
                Value::Bool(true)
            };
            attributes.push((name, value));
        }

        let children = self.children(Some(tag.as_str()))?;
        self.leave();
        Ok(Expr::Element(Element { tag, attributes, children }))
    }

    fn tag_name(&mut self) -> Result<String, RenderError> {
        self.name_with(|c| is_ident_char(c) || matches!(c, '-' | ':' | '.'))
            .map(str::to_string)
            .ok_or_else(|| self.error("Expected JSX tag name"))
    }

    fn attribute_value(&mut self) -> Result<Value, RenderError> {
        if let Some(quote) = self.rest().chars().next().filter(|c| *c == '"' || *c == '\'') {
            self.pos += 1;
            let rest = self.rest();
            let end = rest.find(quote).ok_or_else(|| self.error("Unterminated string attribute"))?;
            self.pos += end + 1;
            return Ok(Value::String(decode_entities(&rest[..end])));
        }
        if self.eat("{") {
            self.skip_trivia()?;
            let value = self.literal()?;
            self.skip_trivia()?;
            self.expect("}")?;
            return Ok(value);
        }
        Err(self.error("Expected attribute value"))
    }

    /// Parse children up to and including the closing tag for `closing` (`None` for `</>`)
    fn children(&mut self, closing: Option<&str>) -> Result<Vec<Child>, RenderError> {
        let mut children = Vec::new();
        loop {
            if self.at_end() {
                let expected = format!("</{}>", closing.unwrap_or(""));
                return Err(self.error(format!("Unterminated JSX contents, expected {}", expected)));
            }

            if self.eat("</") {
                self.skip_whitespace();
                let name = if self.starts_with(">") { None } else { Some(self.tag_name()?) };
                self.skip_whitespace();
                self.expect(">")?;
                if name.as_deref() != closing {
                    return Err(self.error(format!(
                        "Expected corresponding JSX closing tag for <{}>",
                        closing.unwrap_or("")
                    )));
                }
                return Ok(children);
            }

            if self.starts_with("<") {
                children.push(Child::Expr(self.jsx()?));
                continue;
            }

            if self.eat("{") {
                self.skip_trivia()?;
                if !self.eat("}") {
                    let value = self.literal()?;
                    self.skip_trivia()?;
                    self.expect("}")?;
                    children.push(Child::Expr(Expr::Literal(value)));
                }
                continue;
            }

            let rest = self.rest();
            let end = rest.find(|c| c == '<' || c == '{' || c == '}').unwrap_or(rest.len());
            if end == 0 {
                return Err(self.error("Unexpected token \"}\""));
            }
            self.pos += end;
            if let Some(text) = clean_jsx_text(&rest[..end]) {
                children.push(Child::Text(decode_entities(&text)));
            }
        }
    }
}
