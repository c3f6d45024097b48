// File: src/lexer.rs
//
// Lexer for the Brio programming language.
// Turns source text into a flat token stream with line/column positions.

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Int(i64),
    Str(String),

    Assign,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Bang,
    Lt,
    Gt,
    Eq,
    NotEq,

    Comma,
    Semicolon,
    Colon,
    Lparen,
    Rparen,
    Lbrace,
    Rbrace,
    Lbracket,
    Rbracket,

    Fn,
    Let,
    True,
    False,
    If,
    Else,
    Return,
    While,

    Illegal(char),
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

fn single_char_kind(c: char) -> Option<TokenKind> {
    Some(match c {
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Asterisk,
        '/' => TokenKind::Slash,
        '<' => TokenKind::Lt,
        '>' => TokenKind::Gt,
        ',' => TokenKind::Comma,
        ';' => TokenKind::Semicolon,
        ':' => TokenKind::Colon,
        '(' => TokenKind::Lparen,
        ')' => TokenKind::Rparen,
        '{' => TokenKind::Lbrace,
        '}' => TokenKind::Rbrace,
        '[' => TokenKind::Lbracket,
        ']' => TokenKind::Rbracket,
        _ => return None,
    })
}

pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1;
    let mut col = 1;

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\r' => {
                chars.next();
                col += 1;
            }
            '\n' => {
                chars.next();
                line += 1;
                col = 1;
            }
            '"' => {
                chars.next(); // opening quote
                let start_col = col;
                col += 1;
                let mut s = String::new();
                while let Some(&ch) = chars.peek() {
                    chars.next();
                    col += 1;
                    if ch == '"' {
                        break;
                    }
                    if ch == '\\' {
                        if let Some(&esc) = chars.peek() {
                            chars.next();
                            col += 1;
                            match esc {
                                'n' => s.push('\n'),
                                't' => s.push('\t'),
                                '\\' => s.push('\\'),
                                '"' => s.push('"'),
                                _ => s.push(esc),
                            }
                        }
                    } else {
                        if ch == '\n' {
                            line += 1;
                            col = 1;
                        }
                        s.push(ch);
                    }
                }
                tokens.push(Token { kind: TokenKind::Str(s), line, column: start_col });
            }
            '0'..='9' => {
                let start_col = col;
                let mut num = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_digit() {
                        num.push(ch);
                        chars.next();
                        col += 1;
                    } else {
                        break;
                    }
                }
                let parsed = num.parse().unwrap_or(0);
                tokens.push(Token { kind: TokenKind::Int(parsed), line, column: start_col });
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let start_col = col;
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        ident.push(ch);
                        chars.next();
                        col += 1;
                    } else {
                        break;
                    }
                }
                let kind = match ident.as_str() {
                    "fn" => TokenKind::Fn,
                    "let" => TokenKind::Let,
                    "true" => TokenKind::True,
                    "false" => TokenKind::False,
                    "if" => TokenKind::If,
                    "else" => TokenKind::Else,
                    "return" => TokenKind::Return,
                    "while" => TokenKind::While,
                    _ => TokenKind::Ident(ident),
                };
                tokens.push(Token { kind, line, column: start_col });
            }
            '=' => {
                let start_col = col;
                chars.next();
                col += 1;
                if chars.peek() == Some(&'=') {
                    chars.next();
                    col += 1;
                    tokens.push(Token { kind: TokenKind::Eq, line, column: start_col });
                } else {
                    tokens.push(Token { kind: TokenKind::Assign, line, column: start_col });
                }
            }
            '!' => {
                let start_col = col;
                chars.next();
                col += 1;
                if chars.peek() == Some(&'=') {
                    chars.next();
                    col += 1;
                    tokens.push(Token { kind: TokenKind::NotEq, line, column: start_col });
                } else {
                    tokens.push(Token { kind: TokenKind::Bang, line, column: start_col });
                }
            }
            other => {
                let kind = single_char_kind(other).unwrap_or(TokenKind::Illegal(other));
                tokens.push(Token { kind, line, column: col });
                chars.next();
                col += 1;
            }
        }
    }

    tokens.push(Token { kind: TokenKind::Eof, line, column: col });
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_operators_and_delimiters() {
        let kinds: Vec<TokenKind> =
            tokenize("=+(){},;").into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Assign,
                TokenKind::Plus,
                TokenKind::Lparen,
                TokenKind::Rparen,
                TokenKind::Lbrace,
                TokenKind::Rbrace,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenizes_keywords_literals_and_two_char_operators() {
        let input = r#"let five = 5;
            let add = fn(x, y) { x + y; };
            if (five != 10) { "yes\n" } else { false }
            while (five == 5) { five < 6 }"#;
        let kinds: Vec<TokenKind> = tokenize(input).into_iter().map(|t| t.kind).collect();
        assert!(kinds.contains(&TokenKind::Let));
        assert!(kinds.contains(&TokenKind::Fn));
        assert!(kinds.contains(&TokenKind::If));
        assert!(kinds.contains(&TokenKind::Else));
        assert!(kinds.contains(&TokenKind::While));
        assert!(kinds.contains(&TokenKind::Int(5)));
        assert!(kinds.contains(&TokenKind::NotEq));
        assert!(kinds.contains(&TokenKind::Eq));
        assert!(kinds.contains(&TokenKind::Lt));
        assert!(kinds.contains(&TokenKind::Str("yes\n".to_string())));
        assert!(kinds.contains(&TokenKind::Ident("add".to_string())));
        assert_eq!(kinds.last(), Some(&TokenKind::Eof));
    }

    #[test]
    fn tracks_line_numbers() {
        let tokens = tokenize("1\n2");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
    }
}
