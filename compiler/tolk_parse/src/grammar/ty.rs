//! Type expressions.
//!
//! ```text
//! type      := nullable ('|' nullable)*
//! nullable  := primary '?'*
//! primary   := name ('<' type,* '>')? | 'null'
//!            | '(' type,* ')' ('->' type)?
//!            | '[' type,* ']'
//! ```

use tolk_ir::{ensure_sufficient_stack, Child, FieldName, NodeId, NodeKind};

use crate::{PResult, Parser, TokenKind};

impl Parser<'_> {
    pub(crate) fn parse_type(&mut self) -> PResult<NodeId> {
        ensure_sufficient_stack(|| self.parse_union_type())
    }

    fn parse_union_type(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let first = self.parse_nullable_type()?;
        if !self.check(TokenKind::Pipe) {
            return Ok(first);
        }
        let mut variants = vec![Child::plain(first)];
        while self.eat(TokenKind::Pipe) {
            variants.push(Child::plain(self.parse_nullable_type()?));
        }
        Ok(self.finish(NodeKind::UnionType, start, variants))
    }

    fn parse_nullable_type(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let mut ty = self.parse_primary_type()?;
        while self.eat(TokenKind::Question) {
            ty = self.finish(
                NodeKind::NullableType,
                start,
                [Child::labeled(FieldName::Inner, ty)],
            );
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> PResult<NodeId> {
        let start = self.start();
        match self.current_kind() {
            TokenKind::Ident => {
                let name = self.leaf(NodeKind::TypeIdentifier);
                if !self.check(TokenKind::Lt) {
                    return Ok(name);
                }
                let arguments = self.parse_instantiation_type_list()?;
                Ok(self.finish(
                    NodeKind::InstantiatedType,
                    start,
                    [
                        Child::labeled(FieldName::Name, name),
                        Child::labeled(FieldName::Arguments, arguments),
                    ],
                ))
            }
            TokenKind::Null => Ok(self.leaf(NodeKind::TypeIdentifier)),
            TokenKind::LParen => {
                self.cursor.advance();
                let (elements, trailing_comma) = self.parse_type_elements(TokenKind::RParen)?;
                let close = self.expect(TokenKind::RParen)?;

                if self.eat(TokenKind::Arrow) {
                    // Parameters of a callable are always a tensor.
                    let params = self.builder.push(
                        NodeKind::TensorType,
                        tolk_ir::Span::new(start, close.end),
                        elements,
                    );
                    let return_type = self.parse_nullable_type()?;
                    return Ok(self.finish(
                        NodeKind::FunCallableType,
                        start,
                        [
                            Child::labeled(FieldName::ParamTypes, params),
                            Child::labeled(FieldName::ReturnType, return_type),
                        ],
                    ));
                }

                if let [single] = elements.as_slice() {
                    if !trailing_comma {
                        let inner = single.node;
                        return Ok(self.finish(
                            NodeKind::ParenthesizedType,
                            start,
                            [Child::labeled(FieldName::Inner, inner)],
                        ));
                    }
                }
                Ok(self.finish(NodeKind::TensorType, start, elements))
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let (elements, _) = self.parse_type_elements(TokenKind::RBracket)?;
                self.expect(TokenKind::RBracket)?;
                Ok(self.finish(NodeKind::TupleType, start, elements))
            }
            _ => Err(self.error_expected("type")),
        }
    }

    /// Comma-separated types up to (not including) `close`.
    fn parse_type_elements(&mut self, close: TokenKind) -> PResult<(Vec<Child>, bool)> {
        let mut elements = Vec::new();
        let mut trailing_comma = false;
        while !self.check(close) {
            elements.push(Child::plain(self.parse_type()?));
            trailing_comma = self.eat(TokenKind::Comma);
            if !trailing_comma {
                break;
            }
        }
        Ok((elements, trailing_comma))
    }

    /// `<int, slice>`; each `>` is its own token, so nested lists close
    /// one level per token.
    pub(crate) fn parse_instantiation_type_list(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect(TokenKind::Lt)?;
        let mut arguments = Vec::new();
        while !self.check(TokenKind::Gt) {
            arguments.push(Child::plain(self.parse_type()?));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Gt)?;
        Ok(self.finish(NodeKind::InstantiationTypeList, start, arguments))
    }
}
