//! Recursive-descent parser for LuaLS type expressions.
//!
//! Grammar (loosest binding first):
//! ```text
//! union   := '|'? postfix ('|' postfix)*
//! postfix := primary ('[]' | '?')*
//! primary := '(' union ')' | literal | 'fun' '(' params ')' (':' union)?
//!          | '[' union (',' union)* ']' | '{' field (',' field)* '}'
//!          | name ('<' union (',' union)* '>')?
//! ```

use crate::expr::{Literal, TypeExpr};

#[derive(Debug, Clone, PartialEq)]
enum Token {
  Ident(String),
  Str(String),
  Number(String),
  Punct(char),
  Ellipsis,
}

const PUNCT: &[char] = &['<', '>', '[', ']', '(', ')', '{', '}', ',', '|', '?', ':'];

fn tokenize(text: &str) -> Option<Vec<Token>> {
  let chars: Vec<char> = text.chars().collect();
  let mut tokens = Vec::new();
  let mut i = 0;

  while i < chars.len() {
    let c = chars[i];

    if c.is_whitespace() {
      i += 1;
    } else if chars[i..].starts_with(&['.', '.', '.']) {
      tokens.push(Token::Ellipsis);
      i += 3;
    } else if PUNCT.contains(&c) {
      tokens.push(Token::Punct(c));
      i += 1;
    } else if c == '"' || c == '\'' || c == '`' {
      let quote = c;
      let mut value = String::new();
      i += 1;
      loop {
        let ch = *chars.get(i)?;
        i += 1;
        if ch == quote {
          break;
        }
        if ch == '\\' {
          value.push(*chars.get(i)?);
          i += 1;
        } else {
          value.push(ch);
        }
      }
      tokens.push(Token::Str(value));
    } else if c.is_ascii_digit() || (c == '-' && chars.get(i + 1).is_some_and(char::is_ascii_digit))
    {
      let start = i;
      i += 1;
      while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '.') {
        i += 1;
      }
      tokens.push(Token::Number(chars[start..i].iter().collect()));
    } else if c.is_alphabetic() || c == '_' {
      let start = i;
      while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.') {
        i += 1;
      }
      tokens.push(Token::Ident(chars[start..i].iter().collect()));
    } else {
      return None;
    }
  }

  Some(tokens)
}

struct Parser {
  tokens: Vec<Token>,
  pos: usize,
}

impl Parser {
  fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.pos)
  }

  fn peek_at(&self, offset: usize) -> Option<&Token> {
    self.tokens.get(self.pos + offset)
  }

  fn next(&mut self) -> Option<Token> {
    let token = self.tokens.get(self.pos).cloned();
    self.pos += 1;
    token
  }

  fn eat(&mut self, c: char) -> bool {
    if self.peek() == Some(&Token::Punct(c)) {
      self.pos += 1;
      true
    } else {
      false
    }
  }

  fn expect(&mut self, c: char) -> Option<()> {
    self.eat(c).then_some(())
  }

  fn at_end(&self) -> bool {
    self.pos >= self.tokens.len()
  }

  fn union(&mut self) -> Option<TypeExpr> {
    self.eat('|');
    let mut members = vec![self.postfix()?];
    while self.eat('|') {
      members.push(self.postfix()?);
    }
    if members.len() == 1 {
      members.pop()
    } else {
      Some(TypeExpr::Union(members))
    }
  }

  fn postfix(&mut self) -> Option<TypeExpr> {
    let mut expr = self.primary()?;
    loop {
      if self.peek() == Some(&Token::Punct('['))
        && self.peek_at(1) == Some(&Token::Punct(']'))
      {
        self.pos += 2;
        expr = TypeExpr::Array(Box::new(expr));
      } else if self.eat('?') {
        expr = TypeExpr::Optional(Box::new(expr));
      } else {
        return Some(expr);
      }
    }
  }

  /// Parse `item (',' item)*` up to and including `close`.
  fn list<T>(&mut self, close: char, mut item: impl FnMut(&mut Self) -> Option<T>) -> Option<Vec<T>> {
    let mut items = Vec::new();
    if self.eat(close) {
      return Some(items);
    }
    loop {
      items.push(item(self)?);
      if self.eat(close) {
        return Some(items);
      }
      self.expect(',')?;
    }
  }

  fn primary(&mut self) -> Option<TypeExpr> {
    match self.next()? {
      Token::Punct('(') => {
        let inner = self.union()?;
        self.expect(')')?;
        Some(inner)
      }
      Token::Punct('[') => self.list(']', Self::union).map(TypeExpr::Tuple),
      Token::Punct('{') => self.list('}', Self::record_field).map(TypeExpr::Record),
      Token::Str(value) => Some(TypeExpr::Literal(Literal::Str(value))),
      Token::Number(value) => Some(TypeExpr::Literal(Literal::Number(value))),
      Token::Ident(name) => match name.as_str() {
        "true" => Some(TypeExpr::Literal(Literal::Bool(true))),
        "false" => Some(TypeExpr::Literal(Literal::Bool(false))),
        "fun" if self.peek() == Some(&Token::Punct('(')) => {
          self.pos += 1;
          self.function()
        }
        _ => {
          if self.eat('<') {
            let args = self.list('>', Self::union)?;
            Some(TypeExpr::Apply { name, args })
          } else {
            Some(TypeExpr::Name(name))
          }
        }
      },
      _ => None,
    }
  }

  fn function(&mut self) -> Option<TypeExpr> {
    let params = self.list(')', |p| {
      let name = match p.next()? {
        Token::Ident(name) => name,
        Token::Ellipsis => "...".to_string(),
        _ => return None,
      };
      let optional = p.eat('?');
      let ty = if p.eat(':') {
        p.union()?
      } else {
        TypeExpr::name("any")
      };
      let ty = if optional {
        TypeExpr::Optional(Box::new(ty))
      } else {
        ty
      };
      Some((name, ty))
    })?;

    let returns = if self.eat(':') {
      vec![self.union()?]
    } else {
      Vec::new()
    };

    Some(TypeExpr::Function { params, returns })
  }

  fn record_field(&mut self) -> Option<(String, TypeExpr)> {
    let name = match self.next()? {
      Token::Ident(name) | Token::Str(name) => name,
      _ => return None,
    };
    let optional = self.eat('?');
    self.expect(':')?;
    let ty = self.union()?;
    let ty = if optional {
      TypeExpr::Optional(Box::new(ty))
    } else {
      ty
    };
    Some((name, ty))
  }
}

/// Parse annotation text into a [`TypeExpr`].
///
/// Never fails: text that does not fit the grammar comes back as
/// [`TypeExpr::Unparsed`] holding the trimmed input.
pub fn parse_type(text: &str) -> TypeExpr {
  let trimmed = text.trim();
  let parsed = tokenize(trimmed).and_then(|tokens| {
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.union()?;
    parser.at_end().then_some(expr)
  });
  parsed.unwrap_or_else(|| TypeExpr::Unparsed(trimmed.to_string()))
}
