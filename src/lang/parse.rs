use super::ast::*;
use super::token::{Operator, Token, Word};
use super::{Error, LineNumber, MaxValue};
use crate::error;
use std::collections::HashSet;

type Result<T> = std::result::Result<T, Error>;

/// Built-in function names. The parser only needs the names to resolve
/// `name(args)`; arities and implementations live with the machine.
const BUILTINS: [&str; 22] = [
    "ABS", "ASC", "ATN", "CHR$", "COS", "EXP", "GET", "INT", "LEFT$", "LEN", "LOG", "MID$",
    "RIGHT$", "RND", "SGN", "SIN", "SPC", "SQR", "STR$", "TAB", "TAN", "VAL",
];

fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// Parse one line of tokens into a statement list. `functions` is the
/// registry of names declared by DEF; it persists across lines so that
/// later references parse as function calls instead of array references.
pub fn parse(tokens: &[Token], functions: &mut HashSet<String>) -> Result<Vec<Statement>> {
    Parser {
        tokens,
        pos: 0,
        functions,
    }
    .statement_list()
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    functions: &'a mut HashSet<String>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eol)
    }

    fn peek_second(&self) -> &Token {
        self.tokens.get(self.pos + 1).unwrap_or(&Token::Eol)
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        matches!(self.peek(), Token::Eol)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: Word) -> bool {
        self.eat(&Token::Word(word))
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(error!(Syntax; "Expected {}; found {}", token, self.peek()))
        }
    }

    fn expect_word(&mut self, word: Word) -> Result<()> {
        self.expect(&Token::Word(word))
    }

    fn ident(&mut self) -> Result<String> {
        match self.bump() {
            Token::Ident(name) => Ok(name),
            other => Err(error!(Syntax; "Expected a name; found {}", other)),
        }
    }

    fn statement_list(&mut self) -> Result<Vec<Statement>> {
        let mut statements = vec![];
        loop {
            while self.eat(&Token::Colon) {}
            if self.at_end() {
                break;
            }
            statements.push(self.statement()?);
            match self.peek() {
                Token::Colon | Token::Eol | Token::Word(Word::Rem) => continue,
                other => {
                    return Err(error!(Syntax; "Expected end of statement; found {}", other));
                }
            }
        }
        Ok(statements)
    }

    fn statement(&mut self) -> Result<Statement> {
        match self.bump() {
            Token::Ident(name) => self.assignment(name),
            Token::Word(word) => match word {
                Word::Rem => self.remark(),
                Word::Let => {
                    let name = self.ident()?;
                    self.assignment(name)
                }
                Word::Print => self.print_statement(),
                Word::If => self.if_statement(),
                Word::On => self.on_statement(),
                Word::For => self.for_statement(),
                Word::Next => self.next_statement(),
                Word::Goto => Ok(Statement::Goto(self.expression()?)),
                Word::Gosub => Ok(Statement::Gosub(self.expression()?)),
                Word::Return => Ok(Statement::Return),
                Word::End => Ok(Statement::End),
                Word::Stop => Ok(Statement::Stop),
                Word::Clear => Ok(Statement::Clear),
                Word::Restore => Ok(Statement::Restore(self.optional_expression()?)),
                Word::Randomize => Ok(Statement::Randomize(self.optional_expression()?)),
                Word::Dim => self.dim_statement(),
                Word::Input => self.input_statement(),
                Word::Read => self.read_statement(),
                Word::Data => self.data_statement(),
                Word::Def => self.def_statement(),
                Word::Open => self.open_statement(),
                Word::Close => self.close_statement(),
                Word::Run | Word::New => {
                    Err(error!(Syntax; "{} is a command, not a statement", word))
                }
                other => Err(error!(Syntax; "Expected statement; found {}", other)),
            },
            other => Err(error!(Syntax; "Expected statement; found {}", other)),
        }
    }

    fn remark(&mut self) -> Result<Statement> {
        while !self.at_end() {
            self.pos += 1;
        }
        Ok(Statement::Rem)
    }

    fn assignment(&mut self, name: String) -> Result<Statement> {
        let target = self.target_with_name(name)?;
        self.expect(&Token::Operator(Operator::Equal))?;
        Ok(Statement::Let(target, self.expression()?))
    }

    fn target(&mut self) -> Result<Variable> {
        let name = self.ident()?;
        self.target_with_name(name)
    }

    fn target_with_name(&mut self, name: String) -> Result<Variable> {
        let indices = if self.eat(&Token::LParen) {
            self.expression_list(&Token::RParen)?
        } else {
            vec![]
        };
        Ok(Variable { name, indices })
    }

    fn target_list(&mut self) -> Result<Vec<Variable>> {
        let mut targets = vec![self.target()?];
        while self.eat(&Token::Comma) {
            targets.push(self.target()?);
        }
        Ok(targets)
    }

    fn print_statement(&mut self) -> Result<Statement> {
        let channel = if self.eat(&Token::Hash) {
            let channel = self.expression()?;
            self.expect(&Token::Comma)?;
            Some(channel)
        } else {
            None
        };
        let mut items = vec![];
        loop {
            match self.peek() {
                Token::Colon | Token::Eol | Token::Word(Word::Rem) => break,
                Token::Comma => {
                    self.pos += 1;
                    items.push(PrintItem::Comma);
                }
                Token::Semicolon => {
                    self.pos += 1;
                    items.push(PrintItem::Semicolon);
                }
                _ => items.push(PrintItem::Expr(self.expression()?)),
            }
        }
        Ok(Statement::Print(channel, items))
    }

    fn if_statement(&mut self) -> Result<Statement> {
        let predicate = self.expression()?;
        self.expect_word(Word::Then)?;
        let tokens = self.tokens;
        let start = self.pos;
        let mut end = start;
        let mut split = None;
        let mut depth = 0usize;
        while end < tokens.len()
            && tokens[end] != Token::Eol
            && tokens[end] != Token::Word(Word::Rem)
        {
            match &tokens[end] {
                Token::LParen => depth += 1,
                Token::RParen => depth = depth.saturating_sub(1),
                Token::Word(Word::Else) if depth == 0 && split.is_none() => split = Some(end),
                _ => {}
            }
            end += 1;
        }
        self.pos = end;
        let (then_tokens, else_tokens) = match split {
            Some(at) => (&tokens[start..at], &tokens[at + 1..end]),
            None => (&tokens[start..end], &tokens[end..end]),
        };
        let then_branch = self.branch(then_tokens)?;
        let else_branch = if else_tokens.is_empty() {
            vec![]
        } else {
            self.branch(else_tokens)?
        };
        Ok(Statement::If(predicate, then_branch, else_branch))
    }

    /// A branch that is a single number is sugar for GOTO; anything else is
    /// a statement list in its own right.
    fn branch(&mut self, tokens: &'a [Token]) -> Result<Vec<Statement>> {
        if let [Token::Number(n)] = tokens {
            return Ok(vec![Statement::Goto(Expression::Number(*n))]);
        }
        Parser {
            tokens,
            pos: 0,
            functions: &mut *self.functions,
        }
        .statement_list()
    }

    fn on_statement(&mut self) -> Result<Statement> {
        let selector = self.expression()?;
        let gosub = match self.bump() {
            Token::Word(Word::Goto) => false,
            Token::Word(Word::Gosub) => true,
            other => return Err(error!(Syntax; "Expected GOTO or GOSUB; found {}", other)),
        };
        let mut lines = vec![self.line_number()?];
        while self.eat(&Token::Comma) {
            lines.push(self.line_number()?);
        }
        if gosub {
            Ok(Statement::OnGosub(selector, lines))
        } else {
            Ok(Statement::OnGoto(selector, lines))
        }
    }

    fn line_number(&mut self) -> Result<u16> {
        match self.bump() {
            Token::Number(n) if n.fract() == 0.0 && n >= 0.0 && n <= LineNumber::max_value() as f64 => {
                Ok(n as u16)
            }
            other => Err(error!(Syntax; "Invalid line number {}", other)),
        }
    }

    fn for_statement(&mut self) -> Result<Statement> {
        let name = self.ident()?;
        if name.ends_with('$') {
            return Err(error!(Syntax; "FOR requires a numeric loop variable"));
        }
        self.expect(&Token::Operator(Operator::Equal))?;
        let from = self.expression()?;
        self.expect_word(Word::To)?;
        let to = self.expression()?;
        let step = if self.eat_word(Word::Step) {
            self.expression()?
        } else {
            Expression::Number(1.0)
        };
        Ok(Statement::For(name, from, to, step))
    }

    fn next_statement(&mut self) -> Result<Statement> {
        if let Token::Ident(_) = self.peek() {
            Ok(Statement::Next(Some(self.ident()?)))
        } else {
            Ok(Statement::Next(None))
        }
    }

    fn optional_expression(&mut self) -> Result<Option<Expression>> {
        match self.peek() {
            Token::Colon | Token::Eol | Token::Word(Word::Rem) => Ok(None),
            _ => Ok(Some(self.expression()?)),
        }
    }

    fn dim_statement(&mut self) -> Result<Statement> {
        let mut entries = vec![];
        loop {
            let name = self.ident()?;
            self.expect(&Token::LParen)?;
            let indices = self.expression_list(&Token::RParen)?;
            entries.push(Variable { name, indices });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(Statement::Dim(entries))
    }

    fn input_statement(&mut self) -> Result<Statement> {
        let prompt = match (self.peek(), self.peek_second()) {
            (Token::String(s), Token::Semicolon) => {
                let s = s.clone();
                self.pos += 2;
                Some(s)
            }
            _ => None,
        };
        let channel = if self.eat(&Token::Hash) {
            let channel = self.expression()?;
            self.expect(&Token::Comma)?;
            Some(channel)
        } else {
            None
        };
        Ok(Statement::Input(prompt, channel, self.target_list()?))
    }

    fn read_statement(&mut self) -> Result<Statement> {
        Ok(Statement::Read(self.target_list()?))
    }

    fn data_statement(&mut self) -> Result<Statement> {
        let mut items = vec![];
        loop {
            let item = match self.bump() {
                Token::String(s) => Expression::String(s),
                Token::Number(n) => Expression::Number(n),
                Token::Operator(Operator::Minus) => match self.bump() {
                    Token::Number(n) => Expression::Number(-n),
                    other => {
                        return Err(error!(Syntax; "Expected DATA literal; found {}", other))
                    }
                },
                Token::Operator(Operator::Plus) => match self.bump() {
                    Token::Number(n) => Expression::Number(n),
                    other => {
                        return Err(error!(Syntax; "Expected DATA literal; found {}", other))
                    }
                },
                other => return Err(error!(Syntax; "Expected DATA literal; found {}", other)),
            };
            items.push(item);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(Statement::Data(items))
    }

    fn def_statement(&mut self) -> Result<Statement> {
        let name = self.ident()?;
        if is_builtin(&name) {
            return Err(error!(Syntax; "{} is reserved for a built-in function", name));
        }
        self.expect(&Token::LParen)?;
        let mut params = vec![];
        if !self.eat(&Token::RParen) {
            loop {
                params.push(self.ident()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RParen)?;
        }
        self.expect(&Token::Operator(Operator::Equal))?;
        // Registered before the body parses so the function may call itself.
        self.functions.insert(name.clone());
        let body = self.expression()?;
        Ok(Statement::Def(name, params, body))
    }

    fn open_statement(&mut self) -> Result<Statement> {
        let path = self.expression()?;
        self.expect_word(Word::For)?;
        let mode = match self.bump() {
            Token::Word(Word::Input) => OpenMode::Input,
            Token::Word(Word::Output) => OpenMode::Output,
            Token::Word(Word::Append) => OpenMode::Append,
            other => {
                return Err(error!(Syntax; "Expected INPUT, OUTPUT or APPEND; found {}", other))
            }
        };
        self.expect_word(Word::As)?;
        self.eat(&Token::Hash);
        Ok(Statement::Open(path, mode, self.expression()?))
    }

    fn close_statement(&mut self) -> Result<Statement> {
        let mut channels = vec![];
        if !matches!(self.peek(), Token::Colon | Token::Eol | Token::Word(Word::Rem)) {
            loop {
                self.eat(&Token::Hash);
                channels.push(self.expression()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        Ok(Statement::Close(channels))
    }

    fn expression_list(&mut self, close: &Token) -> Result<Vec<Expression>> {
        let mut list = vec![];
        if !self.eat(close) {
            loop {
                list.push(self.expression()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(close)?;
        }
        Ok(list)
    }

    fn expression(&mut self) -> Result<Expression> {
        self.expression_prec(2)
    }

    fn expression_prec(&mut self, min_prec: u8) -> Result<Expression> {
        let mut lhs = self.prefix()?;
        while let Some((prec, right_assoc)) = self.binary_prec() {
            if prec < min_prec {
                break;
            }
            let token = self.bump();
            // `^` recurses at its own level for right associativity; every
            // other operator recurses one level tighter.
            let rhs = self.expression_prec(if right_assoc { prec } else { prec + 1 })?;
            lhs = binary(&token, lhs, rhs);
        }
        Ok(lhs)
    }

    fn binary_prec(&self) -> Option<(u8, bool)> {
        use Operator::*;
        match self.peek() {
            Token::Operator(Caret) => Some((7, true)),
            Token::Operator(Multiply) | Token::Operator(Divide) => Some((6, false)),
            Token::Operator(Plus) | Token::Operator(Minus) => Some((5, false)),
            Token::Operator(Equal)
            | Token::Operator(NotEqual)
            | Token::Operator(Less)
            | Token::Operator(LessEqual)
            | Token::Operator(Greater)
            | Token::Operator(GreaterEqual) => Some((4, false)),
            Token::Word(Word::And) => Some((3, false)),
            Token::Word(Word::Or) => Some((2, false)),
            _ => None,
        }
    }

    fn prefix(&mut self) -> Result<Expression> {
        match self.bump() {
            Token::Number(n) => Ok(Expression::Number(n)),
            Token::String(s) => Ok(Expression::String(s)),
            Token::Operator(Operator::Plus) => self.expression_prec(7),
            Token::Operator(Operator::Minus) => {
                Ok(Expression::Negate(Box::new(self.expression_prec(7)?)))
            }
            Token::Word(Word::Not) => Ok(Expression::Not(Box::new(self.expression_prec(6)?))),
            Token::LParen => {
                let inner = self.expression_prec(2)?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(name) => self.ident_expression(name),
            other => Err(error!(Syntax; "Expected expression; found {}", other)),
        }
    }

    fn ident_expression(&mut self, name: String) -> Result<Expression> {
        if self.eat(&Token::LParen) {
            let args = self.expression_list(&Token::RParen)?;
            if is_builtin(&name) {
                Ok(Expression::Builtin(name, args))
            } else if self.functions.contains(&name) {
                Ok(Expression::UserFn(name, args))
            } else {
                Ok(Expression::Array(name, args))
            }
        } else if name == "RND" || name == "GET" {
            Ok(Expression::Builtin(name, vec![]))
        } else {
            Ok(Expression::Variable(name))
        }
    }
}

fn binary(token: &Token, lhs: Expression, rhs: Expression) -> Expression {
    use Expression::*;
    let lhs = Box::new(lhs);
    let rhs = Box::new(rhs);
    match token {
        Token::Operator(Operator::Caret) => Power(lhs, rhs),
        Token::Operator(Operator::Multiply) => Multiply(lhs, rhs),
        Token::Operator(Operator::Divide) => Divide(lhs, rhs),
        Token::Operator(Operator::Plus) => Add(lhs, rhs),
        Token::Operator(Operator::Minus) => Subtract(lhs, rhs),
        Token::Operator(Operator::Equal) => Equal(lhs, rhs),
        Token::Operator(Operator::NotEqual) => NotEqual(lhs, rhs),
        Token::Operator(Operator::Less) => Less(lhs, rhs),
        Token::Operator(Operator::LessEqual) => LessEqual(lhs, rhs),
        Token::Operator(Operator::Greater) => Greater(lhs, rhs),
        Token::Operator(Operator::GreaterEqual) => GreaterEqual(lhs, rhs),
        Token::Word(Word::And) => And(lhs, rhs),
        Token::Word(Word::Or) => Or(lhs, rhs),
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::lex::tokenize;
    use super::*;

    fn parse_str(s: &str) -> Result<Vec<Statement>> {
        let tokens = tokenize(s)?;
        let mut functions = HashSet::new();
        parse(&tokens, &mut functions)
    }

    #[test]
    fn test_assignment_without_let() {
        let ast = parse_str("A=1").unwrap();
        assert_eq!(
            ast,
            vec![Statement::Let(
                Variable::scalar("A"),
                Expression::Number(1.0)
            )]
        );
    }

    #[test]
    fn test_let_assignment() {
        assert_eq!(parse_str("LET A=1").unwrap(), parse_str("A=1").unwrap());
    }

    #[test]
    fn test_colon_separators() {
        let ast = parse_str(":A=1::B=2:").unwrap();
        assert_eq!(ast.len(), 2);
    }

    #[test]
    fn test_precedence() {
        let ast = parse_str("X=1+2*3").unwrap();
        assert_eq!(
            ast,
            vec![Statement::Let(
                Variable::scalar("X"),
                Expression::Add(
                    Box::new(Expression::Number(1.0)),
                    Box::new(Expression::Multiply(
                        Box::new(Expression::Number(2.0)),
                        Box::new(Expression::Number(3.0))
                    ))
                )
            )]
        );
    }

    #[test]
    fn test_power_right_assoc() {
        let ast = parse_str("X=2^3^2").unwrap();
        assert_eq!(
            ast,
            vec![Statement::Let(
                Variable::scalar("X"),
                Expression::Power(
                    Box::new(Expression::Number(2.0)),
                    Box::new(Expression::Power(
                        Box::new(Expression::Number(3.0)),
                        Box::new(Expression::Number(2.0))
                    ))
                )
            )]
        );
    }

    #[test]
    fn test_if_numeric_branch_is_goto() {
        let ast = parse_str("IF X=5 THEN 60").unwrap();
        match &ast[0] {
            Statement::If(_, then_branch, else_branch) => {
                assert_eq!(
                    then_branch,
                    &vec![Statement::Goto(Expression::Number(60.0))]
                );
                assert!(else_branch.is_empty());
            }
            other => panic!("not an IF: {:?}", other),
        }
    }

    #[test]
    fn test_if_else_split() {
        let ast = parse_str(r#"IF X THEN PRINT "Y":X=1 ELSE 70"#).unwrap();
        match &ast[0] {
            Statement::If(_, then_branch, else_branch) => {
                assert_eq!(then_branch.len(), 2);
                assert_eq!(else_branch, &vec![Statement::Goto(Expression::Number(70.0))]);
            }
            other => panic!("not an IF: {:?}", other),
        }
    }

    #[test]
    fn test_for_default_step() {
        let ast = parse_str("FOR I=1 TO 5").unwrap();
        assert_eq!(
            ast,
            vec![Statement::For(
                "I".to_string(),
                Expression::Number(1.0),
                Expression::Number(5.0),
                Expression::Number(1.0)
            )]
        );
    }

    #[test]
    fn test_for_rejects_string_variable() {
        assert!(parse_str("FOR A$=1 TO 5").is_err());
    }

    #[test]
    fn test_print_items() {
        let ast = parse_str(r#"PRINT A;B,"C";"#).unwrap();
        match &ast[0] {
            Statement::Print(None, items) => assert_eq!(items.len(), 6),
            other => panic!("not a PRINT: {:?}", other),
        }
    }

    #[test]
    fn test_print_channel() {
        let ast = parse_str("PRINT #1, X").unwrap();
        match &ast[0] {
            Statement::Print(Some(Expression::Number(n)), items) => {
                assert_eq!(*n, 1.0);
                assert_eq!(items.len(), 1);
            }
            other => panic!("not a channel PRINT: {:?}", other),
        }
    }

    #[test]
    fn test_input_prompt_and_targets() {
        let ast = parse_str(r#"INPUT "NUMBER";N,M$"#).unwrap();
        assert_eq!(
            ast,
            vec![Statement::Input(
                Some("NUMBER".to_string()),
                None,
                vec![Variable::scalar("N"), Variable::scalar("M$")]
            )]
        );
    }

    #[test]
    fn test_input_channel() {
        let ast = parse_str("INPUT #2, A$").unwrap();
        match &ast[0] {
            Statement::Input(None, Some(_), targets) => assert_eq!(targets.len(), 1),
            other => panic!("not a channel INPUT: {:?}", other),
        }
    }

    #[test]
    fn test_data_signed_numbers() {
        let ast = parse_str(r#"DATA 1,-2,+3,"four""#).unwrap();
        assert_eq!(
            ast,
            vec![Statement::Data(vec![
                Expression::Number(1.0),
                Expression::Number(-2.0),
                Expression::Number(3.0),
                Expression::String("four".to_string()),
            ])]
        );
    }

    #[test]
    fn test_on_goto() {
        let ast = parse_str("ON X GOTO 10,20,30").unwrap();
        match &ast[0] {
            Statement::OnGoto(_, lines) => assert_eq!(lines, &vec![10, 20, 30]),
            other => panic!("not ON GOTO: {:?}", other),
        }
    }

    #[test]
    fn test_def_registers_function() {
        let tokens = tokenize("DEF FNA(X)=X*X").unwrap();
        let mut functions = HashSet::new();
        parse(&tokens, &mut functions).unwrap();
        assert!(functions.contains("FNA"));
        // A later line now parses FNA(2) as a call, not an array.
        let tokens = tokenize("Y=FNA(2)").unwrap();
        let ast = parse(&tokens, &mut functions).unwrap();
        match &ast[0] {
            Statement::Let(_, Expression::UserFn(name, args)) => {
                assert_eq!(name, "FNA");
                assert_eq!(args.len(), 1);
            }
            other => panic!("not a function call: {:?}", other),
        }
    }

    #[test]
    fn test_unregistered_call_is_array() {
        let ast = parse_str("Y=FNA(2)").unwrap();
        match &ast[0] {
            Statement::Let(_, Expression::Array(name, _)) => assert_eq!(name, "FNA"),
            other => panic!("not an array reference: {:?}", other),
        }
    }

    #[test]
    fn test_builtin_call() {
        let ast = parse_str("Y=LEFT$(A$,2)").unwrap();
        match &ast[0] {
            Statement::Let(_, Expression::Builtin(name, args)) => {
                assert_eq!(name, "LEFT$");
                assert_eq!(args.len(), 2);
            }
            other => panic!("not a built-in call: {:?}", other),
        }
    }

    #[test]
    fn test_rnd_without_parens() {
        let ast = parse_str("Y=RND").unwrap();
        match &ast[0] {
            Statement::Let(_, Expression::Builtin(name, args)) => {
                assert_eq!(name, "RND");
                assert!(args.is_empty());
            }
            other => panic!("not RND: {:?}", other),
        }
    }

    #[test]
    fn test_open_statement() {
        let ast = parse_str(r#"OPEN "out.txt" FOR OUTPUT AS #1"#).unwrap();
        match &ast[0] {
            Statement::Open(_, OpenMode::Output, _) => {}
            other => panic!("not an OPEN: {:?}", other),
        }
    }

    #[test]
    fn test_close_lists() {
        assert_eq!(parse_str("CLOSE").unwrap(), vec![Statement::Close(vec![])]);
        match &parse_str("CLOSE #1, 2").unwrap()[0] {
            Statement::Close(channels) => assert_eq!(channels.len(), 2),
            other => panic!("not a CLOSE: {:?}", other),
        }
    }

    #[test]
    fn test_run_rejected_in_program() {
        assert!(parse_str("RUN").is_err());
    }

    #[test]
    fn test_dim_statement() {
        let ast = parse_str("DIM A(5), B$(2,3)").unwrap();
        match &ast[0] {
            Statement::Dim(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[1].indices.len(), 2);
            }
            other => panic!("not a DIM: {:?}", other),
        }
    }
}
