#[cfg(test)]
mod scanner_tests {
    use rox::error::Diagnostics;
    use rox::scanner::*;
    use rox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let tokens: Vec<Token> = Scanner::new(source).filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len(), "tokens: {:?}", tokens);

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*?:})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::QUESTION, "?"),
                (TokenType::COLON, ":"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_maximal_munch() {
        assert_token_sequence(
            "!= == <= >= ! = < > /",
            &[
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::BANG, "!"),
                (TokenType::EQUAL, "="),
                (TokenType::LESS, "<"),
                (TokenType::GREATER, ">"),
                (TokenType::SLASH, "/"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "class fun var break continue orchid _x1",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::FUN, "fun"),
                (TokenType::VAR, "var"),
                (TokenType::BREAK, "break"),
                (TokenType::CONTINUE, "continue"),
                (TokenType::IDENTIFIER, "orchid"),
                (TokenType::IDENTIFIER, "_x1"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_comments_and_lines() {
        let tokens: Vec<Token> = Scanner::new("// nothing here\nvar a; // trailing\n\nprint a;")
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens[0].token_type, TokenType::VAR);
        assert_eq!(tokens[0].line, 2);

        let print = tokens
            .iter()
            .find(|t| t.token_type == TokenType::PRINT)
            .expect("print token");
        assert_eq!(print.line, 4);

        assert_eq!(tokens.last().map(|t| t.line), Some(4));
    }

    #[test]
    fn test_scanner_05_number_literals() {
        let tokens: Vec<Token> = Scanner::new("123 45.67 8.").filter_map(Result::ok).collect();

        let numbers: Vec<f64> = tokens
            .iter()
            .filter_map(|t| match t.token_type {
                TokenType::NUMBER(n) => Some(n),
                _ => None,
            })
            .collect();
        assert_eq!(numbers, vec![123.0, 45.67, 8.0]);

        // The trailing dot is its own token.
        assert_eq!(tokens[3].token_type, TokenType::DOT);

        assert_eq!(tokens[0].to_string(), "NUMBER 123 123.0");
        assert_eq!(tokens[1].to_string(), "NUMBER 45.67 45.67");
    }

    #[test]
    fn test_scanner_06_multiline_string() {
        let tokens: Vec<Token> = Scanner::new("\"one\ntwo\" x").filter_map(Result::ok).collect();

        match &tokens[0].token_type {
            TokenType::STRING(s) => assert_eq!(s, "one\ntwo"),
            other => panic!("expected a string, got {:?}", other),
        }

        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_unterminated_string() {
        let results: Vec<_> = Scanner::new("\"abc").collect();

        assert_eq!(results.len(), 2);

        let err = results[0].as_ref().expect_err("unterminated string must fail");
        assert_eq!(err.to_string(), "[line 1] Error: Unterminated string.");

        match &results[1] {
            Ok(token) => assert_eq!(token.token_type, TokenType::EOF),
            Err(e) => panic!("expected EOF, got {}", e),
        }
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let results: Vec<_> = Scanner::new(",.$(#").collect();

        // COMMA, DOT, error, LEFT_PAREN, error, EOF
        assert_eq!(results.len(), 6);

        let kinds: Vec<Option<TokenType>> = results
            .iter()
            .map(|r| r.as_ref().ok().map(|t| t.token_type.clone()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                Some(TokenType::COMMA),
                Some(TokenType::DOT),
                None,
                Some(TokenType::LEFT_PAREN),
                None,
                Some(TokenType::EOF),
            ]
        );

        let messages: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();
        assert_eq!(
            messages,
            vec![
                "[line 1] Error: Unexpected character: $",
                "[line 1] Error: Unexpected character: #",
            ]
        );
    }

    #[test]
    fn test_scan_tokens_collects_every_error() {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan_tokens("@ var\n^ x;", &mut diagnostics);

        assert!(diagnostics.had_error());
        assert_eq!(diagnostics.errors().len(), 2);
        assert_eq!(
            diagnostics.errors()[1].to_string(),
            "[line 2] Error: Unexpected character: ^"
        );

        assert_eq!(tokens.last().map(|t| t.token_type.clone()), Some(TokenType::EOF));
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_tokens_serialize_to_json() {
        let tokens: Vec<Token> = Scanner::new("print 1;").filter_map(Result::ok).collect();
        let json = serde_json::to_value(&tokens).expect("tokens serialize");

        assert_eq!(json[0]["lexeme"], "print");
        assert_eq!(json[1]["line"], 1);
    }
}
