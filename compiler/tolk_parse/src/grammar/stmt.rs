//! Statements and blocks.

use tolk_ir::{ensure_sufficient_stack, Child, FieldName, NodeId, NodeKind};

use crate::{PResult, Parser, TokenKind};

impl Parser<'_> {
    /// `{ statement* }`. A malformed statement becomes an `ERROR` node and
    /// parsing continues after the next `;`.
    pub(crate) fn parse_block(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.cursor.is_at_end() {
            if self.eat(TokenKind::Semi) {
                continue;
            }
            let snapshot = self.snapshot();
            let statement_start = self.start();
            let statement = match self.parse_statement() {
                Ok(statement) => statement,
                Err(error) => {
                    let node = self.recover(error, snapshot, statement_start, |kind| {
                        kind == TokenKind::Semi
                    });
                    self.eat(TokenKind::Semi);
                    node
                }
            };
            statements.push(Child::plain(statement));
        }
        self.expect(TokenKind::RBrace)?;
        Ok(self.finish(NodeKind::BlockStatement, start, statements))
    }

    fn parse_statement(&mut self) -> PResult<NodeId> {
        ensure_sufficient_stack(|| {
            let start = self.start();
            match self.current_kind() {
                TokenKind::Val | TokenKind::Var => {
                    let declaration = self.parse_local_vars_declaration()?;
                    self.expect(TokenKind::Semi)?;
                    Ok(declaration)
                }
                TokenKind::LBrace => self.parse_block(),
                TokenKind::Return => {
                    self.cursor.advance();
                    let mut children = Vec::new();
                    if !self.check(TokenKind::Semi) {
                        let value = self.parse_expression()?;
                        children.push(Child::labeled(FieldName::Body, value));
                    }
                    self.expect(TokenKind::Semi)?;
                    Ok(self.finish(NodeKind::ReturnStatement, start, children))
                }
                TokenKind::If => self.parse_if(),
                TokenKind::While => {
                    self.cursor.advance();
                    let condition = self.parse_parenthesized_condition()?;
                    let body = self.parse_block()?;
                    Ok(self.finish(
                        NodeKind::WhileStatement,
                        start,
                        [
                            Child::labeled(FieldName::Condition, condition),
                            Child::labeled(FieldName::Body, body),
                        ],
                    ))
                }
                TokenKind::Do => {
                    self.cursor.advance();
                    let body = self.parse_block()?;
                    self.expect(TokenKind::While)?;
                    let condition = self.parse_parenthesized_condition()?;
                    self.expect(TokenKind::Semi)?;
                    Ok(self.finish(
                        NodeKind::DoWhileStatement,
                        start,
                        [
                            Child::labeled(FieldName::Body, body),
                            Child::labeled(FieldName::Condition, condition),
                        ],
                    ))
                }
                TokenKind::Repeat => {
                    self.cursor.advance();
                    let count = self.parse_parenthesized_condition()?;
                    let body = self.parse_block()?;
                    Ok(self.finish(
                        NodeKind::RepeatStatement,
                        start,
                        [
                            Child::labeled(FieldName::Count, count),
                            Child::labeled(FieldName::Body, body),
                        ],
                    ))
                }
                TokenKind::Try => self.parse_try_catch(),
                TokenKind::Throw => {
                    self.cursor.advance();
                    let value = self.parse_expression()?;
                    self.expect(TokenKind::Semi)?;
                    Ok(self.finish(
                        NodeKind::ThrowStatement,
                        start,
                        [Child::labeled(FieldName::ExcNo, value)],
                    ))
                }
                TokenKind::Assert => self.parse_assert(),
                TokenKind::Break => {
                    self.cursor.advance();
                    self.expect(TokenKind::Semi)?;
                    Ok(self.finish(NodeKind::BreakStatement, start, []))
                }
                TokenKind::Continue => {
                    self.cursor.advance();
                    self.expect(TokenKind::Semi)?;
                    Ok(self.finish(NodeKind::ContinueStatement, start, []))
                }
                _ => {
                    let expr = self.parse_expression()?;
                    // `match` used as a statement needs no `;`.
                    if self.builder.kind(expr) == NodeKind::MatchExpression {
                        self.eat(TokenKind::Semi);
                    } else {
                        self.expect(TokenKind::Semi)?;
                    }
                    Ok(self.finish(
                        NodeKind::ExpressionStatement,
                        start,
                        [Child::labeled(FieldName::Expr, expr)],
                    ))
                }
            }
        })
    }

    /// `val lhs[: T] [= value]`; the trailing `;` is left to the caller.
    pub(crate) fn parse_local_vars_declaration(&mut self) -> PResult<NodeId> {
        let start = self.start();
        if !self.eat(TokenKind::Val) {
            self.expect(TokenKind::Var)?;
        }
        let lhs = self.parse_var_pattern()?;
        let mut children = vec![Child::labeled(FieldName::Lhs, lhs)];
        if self.eat(TokenKind::Eq) {
            let value = self.parse_expression()?;
            children.push(Child::labeled(FieldName::AssignedVal, value));
        }
        Ok(self.finish(NodeKind::LocalVarsDeclaration, start, children))
    }

    /// `name[: T] [redef]`, `[a, b]` or `(a, b)`, nested arbitrarily.
    fn parse_var_pattern(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let (kind, close) = match self.current_kind() {
            TokenKind::LBracket => (NodeKind::TupleVarsDeclaration, TokenKind::RBracket),
            TokenKind::LParen => (NodeKind::TensorVarsDeclaration, TokenKind::RParen),
            TokenKind::Ident | TokenKind::Underscore => {
                let name_kind = if self.check(TokenKind::Underscore) {
                    NodeKind::Underscore
                } else {
                    NodeKind::Identifier
                };
                let name = self.leaf(name_kind);
                let mut children = vec![Child::labeled(FieldName::Name, name)];
                if self.eat(TokenKind::Colon) {
                    let ty = self.parse_type()?;
                    children.push(Child::labeled(FieldName::Type, ty));
                }
                if self.check_word("redef") {
                    let redef = self.leaf(NodeKind::Redef);
                    children.push(Child::labeled(FieldName::Redef, redef));
                }
                return Ok(self.finish(NodeKind::VarDeclaration, start, children));
            }
            _ => return Err(self.error_expected("variable name or pattern")),
        };

        self.cursor.advance();
        let mut vars = Vec::new();
        while !self.check(close) {
            vars.push(Child::plain(self.parse_var_pattern()?));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(close)?;
        Ok(self.finish(kind, start, vars))
    }

    /// `(expr)`, returning the inner expression.
    fn parse_parenthesized_condition(&mut self) -> PResult<NodeId> {
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        Ok(condition)
    }

    fn parse_if(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect(TokenKind::If)?;
        let condition = self.parse_parenthesized_condition()?;
        let consequence = self.parse_block()?;
        let mut children = vec![
            Child::labeled(FieldName::Condition, condition),
            Child::labeled(FieldName::Consequence, consequence),
        ];
        if self.eat(TokenKind::Else) {
            let alternative = if self.check(TokenKind::If) {
                self.parse_if()?
            } else {
                self.parse_block()?
            };
            children.push(Child::labeled(FieldName::Alternative, alternative));
        }
        Ok(self.finish(NodeKind::IfStatement, start, children))
    }

    /// `try { } catch (code, arg) { }`
    fn parse_try_catch(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect(TokenKind::Try)?;
        let try_body = self.parse_block()?;

        let catch_start = self.start();
        self.expect(TokenKind::Catch)?;
        let mut catch = Vec::new();
        if self.eat(TokenKind::LParen) {
            if !self.check(TokenKind::RParen) {
                let first = self.parse_catch_var()?;
                catch.push(Child::labeled(FieldName::CatchVar1, first));
                if self.eat(TokenKind::Comma) {
                    let second = self.parse_catch_var()?;
                    catch.push(Child::labeled(FieldName::CatchVar2, second));
                }
            }
            self.expect(TokenKind::RParen)?;
        }
        let catch_body = self.parse_block()?;
        catch.push(Child::labeled(FieldName::CatchBody, catch_body));
        let clause = self.finish(NodeKind::CatchClause, catch_start, catch);

        Ok(self.finish(
            NodeKind::TryCatchStatement,
            start,
            [
                Child::labeled(FieldName::TryBody, try_body),
                Child::labeled(FieldName::CatchClause, clause),
            ],
        ))
    }

    fn parse_catch_var(&mut self) -> PResult<NodeId> {
        if self.check(TokenKind::Underscore) {
            Ok(self.leaf(NodeKind::Underscore))
        } else {
            self.expect_name(NodeKind::Identifier)
        }
    }

    /// `assert (cond) throw code;` or `assert (cond, code);`
    fn parse_assert(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect(TokenKind::Assert)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        let mut children = vec![Child::labeled(FieldName::Condition, condition)];
        if self.eat(TokenKind::Comma) {
            let code = self.parse_expression()?;
            children.push(Child::labeled(FieldName::ExcNo, code));
        }
        self.expect(TokenKind::RParen)?;
        if self.eat(TokenKind::Throw) {
            let code = self.parse_expression()?;
            children.push(Child::labeled(FieldName::ExcNo, code));
        }
        self.expect(TokenKind::Semi)?;
        Ok(self.finish(NodeKind::AssertStatement, start, children))
    }
}
