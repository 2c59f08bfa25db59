//! Expressions.
//!
//! Precedence, loosest first:
//!
//! | Level | Operators |
//! |-------|-----------|
//! | assignment | `=` `+=` `-=` ... `<<=` `>>=` (right-assoc) |
//! | ternary | `? :` |
//! | nullish | `??` |
//! | 1-10 | `\|\|`, `&&`, `\|`, `^`, `&`, `== !=`, `< > <= >= <=>`, `<< >>`, `+ -`, `* / %` |
//! | unary | `!` `-` `+` `~` `lazy` |
//! | cast | `as T`, `is T`, `!is T` |
//! | postfix | call, `.field`, `.0`, `!`, `<T>` |

use tolk_ir::{ensure_sufficient_stack, Child, FieldName, NodeId, NodeKind};

use crate::{PResult, Parser, TokenKind};

/// A binary operator at the cursor: precedence level and token count.
#[derive(Copy, Clone)]
struct BinaryOp {
    level: u8,
    tokens: usize,
}

impl Parser<'_> {
    pub(crate) fn parse_expression(&mut self) -> PResult<NodeId> {
        ensure_sufficient_stack(|| self.parse_assignment())
    }

    fn parse_assignment(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let left = self.parse_ternary()?;

        if self.eat(TokenKind::Eq) {
            let right = self.parse_expression()?;
            return Ok(self.finish(
                NodeKind::Assignment,
                start,
                [
                    Child::labeled(FieldName::Left, left),
                    Child::labeled(FieldName::Right, right),
                ],
            ));
        }

        let op_tokens = if self.cursor.is_shift_right_assign() {
            3
        } else if matches!(
            self.current_kind(),
            TokenKind::PlusAssign
                | TokenKind::MinusAssign
                | TokenKind::StarAssign
                | TokenKind::SlashAssign
                | TokenKind::PercentAssign
                | TokenKind::AmpAssign
                | TokenKind::PipeAssign
                | TokenKind::CaretAssign
                | TokenKind::ShlAssign
        ) {
            1
        } else {
            return Ok(left);
        };
        let operator = self.operator(op_tokens);
        let right = self.parse_expression()?;
        Ok(self.finish(
            NodeKind::SetAssignment,
            start,
            [
                Child::labeled(FieldName::Left, left),
                Child::labeled(FieldName::OperatorName, operator),
                Child::labeled(FieldName::Right, right),
            ],
        ))
    }

    fn parse_ternary(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let condition = self.parse_nullish()?;
        if !self.eat(TokenKind::Question) {
            return Ok(condition);
        }
        let consequence = self.parse_expression()?;
        self.expect(TokenKind::Colon)?;
        let alternative = self.parse_expression()?;
        Ok(self.finish(
            NodeKind::TernaryOperator,
            start,
            [
                Child::labeled(FieldName::Condition, condition),
                Child::labeled(FieldName::Consequence, consequence),
                Child::labeled(FieldName::Alternative, alternative),
            ],
        ))
    }

    fn parse_nullish(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let mut left = self.parse_binary(1)?;
        while self.check(TokenKind::QuestionQuestion) {
            let operator = self.operator(1);
            let right = self.parse_binary(1)?;
            left = self.binary_node(start, left, operator, right);
        }
        Ok(left)
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        let op = |level, tokens| Some(BinaryOp { level, tokens });
        match self.current_kind() {
            TokenKind::PipePipe => op(1, 1),
            TokenKind::AmpAmp => op(2, 1),
            TokenKind::Pipe => op(3, 1),
            TokenKind::Caret => op(4, 1),
            TokenKind::Amp => op(5, 1),
            TokenKind::EqEq | TokenKind::NotEq => op(6, 1),
            TokenKind::Lt | TokenKind::LtEq | TokenKind::Spaceship => op(7, 1),
            TokenKind::Gt if self.cursor.is_shift_right_assign() => None,
            TokenKind::Gt if self.cursor.is_shift_right() => op(8, 2),
            TokenKind::Gt if self.cursor.is_greater_equal() => op(7, 2),
            TokenKind::Gt => op(7, 1),
            TokenKind::Shl => op(8, 1),
            TokenKind::Plus | TokenKind::Minus => op(9, 1),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => op(10, 1),
            _ => None,
        }
    }

    /// Precedence climbing over levels `min_level..=10`.
    fn parse_binary(&mut self, min_level: u8) -> PResult<NodeId> {
        let start = self.start();
        let mut left = self.parse_unary()?;
        while let Some(op) = self.binary_op() {
            if op.level < min_level {
                break;
            }
            let operator = self.operator(op.tokens);
            let right = ensure_sufficient_stack(|| self.parse_binary(op.level + 1))?;
            left = self.binary_node(start, left, operator, right);
        }
        Ok(left)
    }

    fn binary_node(&mut self, start: u32, left: NodeId, operator: NodeId, right: NodeId) -> NodeId {
        self.finish(
            NodeKind::BinaryOperator,
            start,
            [
                Child::labeled(FieldName::Left, left),
                Child::labeled(FieldName::OperatorName, operator),
                Child::labeled(FieldName::Right, right),
            ],
        )
    }

    /// Consume `tokens` adjacent tokens as one `operator` node.
    fn operator(&mut self, tokens: usize) -> NodeId {
        let span = self.cursor.consume_compound(tokens);
        self.builder.push(NodeKind::Operator, span, [])
    }

    fn parse_unary(&mut self) -> PResult<NodeId> {
        let start = self.start();
        match self.current_kind() {
            TokenKind::Bang | TokenKind::Minus | TokenKind::Plus | TokenKind::Tilde => {
                let operator = self.operator(1);
                let argument = ensure_sufficient_stack(|| self.parse_unary())?;
                Ok(self.finish(
                    NodeKind::UnaryOperator,
                    start,
                    [
                        Child::labeled(FieldName::OperatorName, operator),
                        Child::labeled(FieldName::Argument, argument),
                    ],
                ))
            }
            TokenKind::Lazy => {
                self.cursor.advance();
                let argument = ensure_sufficient_stack(|| self.parse_unary())?;
                Ok(self.finish(
                    NodeKind::LazyExpression,
                    start,
                    [Child::labeled(FieldName::Argument, argument)],
                ))
            }
            _ => self.parse_cast(),
        }
    }

    /// `expr as T`, `expr is T`, `expr !is T`
    fn parse_cast(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let mut expr = self.parse_postfix()?;
        loop {
            if self.eat(TokenKind::As) {
                let target = self.parse_type()?;
                expr = self.finish(
                    NodeKind::CastAsOperator,
                    start,
                    [
                        Child::labeled(FieldName::Expr, expr),
                        Child::labeled(FieldName::CastedTo, target),
                    ],
                );
            } else if self.check(TokenKind::Is)
                || (self.check(TokenKind::Bang) && self.cursor.peek_kind(1) == TokenKind::Is)
            {
                let tokens = if self.check(TokenKind::Bang) { 2 } else { 1 };
                let operator = self.operator(tokens);
                let rhs = self.parse_type()?;
                expr = self.finish(
                    NodeKind::IsTypeOperator,
                    start,
                    [
                        Child::labeled(FieldName::Expr, expr),
                        Child::labeled(FieldName::OperatorName, operator),
                        Child::labeled(FieldName::RhsType, rhs),
                    ],
                );
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_postfix(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let mut expr = self.parse_primary()?;
        loop {
            match self.current_kind() {
                TokenKind::LParen => {
                    let arguments = self.parse_argument_list()?;
                    expr = self.finish(
                        NodeKind::FunctionCall,
                        start,
                        [
                            Child::labeled(FieldName::Callee, expr),
                            Child::labeled(FieldName::Arguments, arguments),
                        ],
                    );
                }
                TokenKind::Dot => {
                    self.cursor.advance();
                    let field = match self.current_kind() {
                        TokenKind::Ident => self.leaf(NodeKind::Identifier),
                        TokenKind::Number => self.leaf(NodeKind::NumericIndex),
                        _ => return Err(self.error_expected("field name")),
                    };
                    expr = self.finish(
                        NodeKind::DotAccess,
                        start,
                        [
                            Child::labeled(FieldName::Obj, expr),
                            Child::labeled(FieldName::Field, field),
                        ],
                    );
                }
                TokenKind::Bang if self.cursor.peek_kind(1) != TokenKind::Is => {
                    self.cursor.advance();
                    expr = self.finish(
                        NodeKind::NotNullOperator,
                        start,
                        [Child::labeled(FieldName::Inner, expr)],
                    );
                }
                TokenKind::Lt => {
                    // `f<int>(...)` versus `a < b`: keep the type list only
                    // when a call or member access follows it.
                    let Some(arguments) = self.try_parse(Self::parse_instantiation_type_list, |p| {
                        matches!(p.current_kind(), TokenKind::LParen | TokenKind::Dot)
                    }) else {
                        return Ok(expr);
                    };
                    expr = self.finish(
                        NodeKind::GenericInstantiation,
                        start,
                        [
                            Child::labeled(FieldName::Expr, expr),
                            Child::labeled(FieldName::Arguments, arguments),
                        ],
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    /// `(arg, mutate arg, ...)`
    pub(crate) fn parse_argument_list(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect(TokenKind::LParen)?;
        let mut arguments = Vec::new();
        while !self.check(TokenKind::RParen) {
            let argument_start = self.start();
            let mut children = Vec::new();
            if self.check_word("mutate") && self.cursor.peek_kind(1) == TokenKind::Ident {
                let mutate = self.leaf(NodeKind::Mutate);
                children.push(Child::labeled(FieldName::Mutate, mutate));
            }
            let expr = self.parse_expression()?;
            children.push(Child::labeled(FieldName::Expr, expr));
            arguments.push(Child::plain(self.finish(
                NodeKind::CallArgument,
                argument_start,
                children,
            )));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(self.finish(NodeKind::ArgumentList, start, arguments))
    }

    fn parse_primary(&mut self) -> PResult<NodeId> {
        let start = self.start();
        match self.current_kind() {
            TokenKind::Number => Ok(self.leaf(NodeKind::NumberLiteral)),
            TokenKind::String => Ok(self.leaf(NodeKind::StringLiteral)),
            TokenKind::True | TokenKind::False => Ok(self.leaf(NodeKind::BooleanLiteral)),
            TokenKind::Null => Ok(self.leaf(NodeKind::NullLiteral)),
            TokenKind::Underscore => Ok(self.leaf(NodeKind::Underscore)),
            TokenKind::Ident => self.parse_identifier_or_object_literal(),
            TokenKind::LBrace => self.parse_object_literal(start, None),
            TokenKind::LParen => {
                self.cursor.advance();
                let (elements, trailing_comma) = self.parse_expression_elements(TokenKind::RParen)?;
                self.expect(TokenKind::RParen)?;
                if let [single] = elements.as_slice() {
                    if !trailing_comma {
                        let inner = single.node;
                        return Ok(self.finish(
                            NodeKind::ParenthesizedExpression,
                            start,
                            [Child::labeled(FieldName::Inner, inner)],
                        ));
                    }
                }
                Ok(self.finish(NodeKind::TensorExpression, start, elements))
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let (elements, _) = self.parse_expression_elements(TokenKind::RBracket)?;
                self.expect(TokenKind::RBracket)?;
                Ok(self.finish(NodeKind::TypedTuple, start, elements))
            }
            TokenKind::Match => self.parse_match(),
            _ => Err(self.error_expected("expression")),
        }
    }

    fn parse_expression_elements(&mut self, close: TokenKind) -> PResult<(Vec<Child>, bool)> {
        let mut elements = Vec::new();
        let mut trailing_comma = false;
        while !self.check(close) {
            elements.push(Child::plain(self.parse_expression()?));
            trailing_comma = self.eat(TokenKind::Comma);
            if !trailing_comma {
                break;
            }
        }
        Ok((elements, trailing_comma))
    }

    /// `name`, `Name { ... }` or `Name<T> { ... }`.
    fn parse_identifier_or_object_literal(&mut self) -> PResult<NodeId> {
        let start = self.start();
        match self.cursor.peek_kind(1) {
            TokenKind::LBrace => {
                let ty = self.leaf(NodeKind::TypeIdentifier);
                self.parse_object_literal(start, Some(ty))
            }
            TokenKind::Lt => {
                let typed = self.try_parse(Self::parse_type, |p| p.check(TokenKind::LBrace));
                match typed {
                    Some(ty) => self.parse_object_literal(start, Some(ty)),
                    None => Ok(self.leaf(NodeKind::Identifier)),
                }
            }
            _ => Ok(self.leaf(NodeKind::Identifier)),
        }
    }

    /// `{ field: value, shorthand }` with an optional leading type.
    fn parse_object_literal(&mut self, start: u32, ty: Option<NodeId>) -> PResult<NodeId> {
        let body_start = self.start();
        self.expect(TokenKind::LBrace)?;
        let mut arguments = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let argument_start = self.start();
            let name = self.expect_name(NodeKind::Identifier)?;
            let mut children = vec![Child::labeled(FieldName::Name, name)];
            if self.eat(TokenKind::Colon) {
                let value = self.parse_expression()?;
                children.push(Child::labeled(FieldName::Value, value));
            }
            arguments.push(Child::plain(self.finish(
                NodeKind::InstanceArgument,
                argument_start,
                children,
            )));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        let body = self.finish(NodeKind::ObjectLiteralBody, body_start, arguments);

        let mut children: Vec<Child> = ty
            .map(|ty| Child::labeled(FieldName::Type, ty))
            .into_iter()
            .collect();
        children.push(Child::labeled(FieldName::Arguments, body));
        Ok(self.finish(NodeKind::ObjectLiteral, start, children))
    }

    /// `match (subject) { pattern => body, else => body }`, where the
    /// subject may declare a variable: `match (val x = f())`.
    fn parse_match(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect(TokenKind::Match)?;
        self.expect(TokenKind::LParen)?;
        let subject = if matches!(self.current_kind(), TokenKind::Val | TokenKind::Var) {
            self.parse_local_vars_declaration()?
        } else {
            self.parse_expression()?
        };
        self.expect(TokenKind::RParen)?;
        let mut children = vec![Child::labeled(FieldName::Expr, subject)];

        self.expect(TokenKind::LBrace)?;
        while !self.check(TokenKind::RBrace) && !self.cursor.is_at_end() {
            let arm_start = self.start();
            let pattern = if self.check(TokenKind::Else) {
                self.leaf(NodeKind::MatchElse)
            } else if let Some(ty) =
                self.try_parse(Self::parse_type, |p| p.check(TokenKind::FatArrow))
            {
                ty
            } else {
                self.parse_expression()?
            };
            self.expect(TokenKind::FatArrow)?;
            let body = if self.check(TokenKind::LBrace) {
                self.parse_block()?
            } else {
                self.parse_expression()?
            };
            let arm = self.finish(
                NodeKind::MatchArm,
                arm_start,
                [
                    Child::labeled(FieldName::Pattern, pattern),
                    Child::labeled(FieldName::Body, body),
                ],
            );
            children.push(Child::labeled(FieldName::Arms, arm));
            while self.eat(TokenKind::Comma) || self.eat(TokenKind::Semi) {}
        }
        self.expect(TokenKind::RBrace)?;
        Ok(self.finish(NodeKind::MatchExpression, start, children))
    }
}
