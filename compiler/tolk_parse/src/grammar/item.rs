//! Top-level declarations.

use tolk_ir::{Child, FieldName, NodeId, NodeKind};

use crate::{PResult, Parser, TokenKind};

impl Parser<'_> {
    pub(crate) fn parse_source_file(&mut self) -> NodeId {
        let mut children = Vec::new();
        while !self.cursor.is_at_end() {
            if self.eat(TokenKind::Semi) {
                continue;
            }
            let snapshot = self.snapshot();
            let start = self.start();
            let item = match self.parse_item() {
                Ok(item) => item,
                Err(error) => self.recover(error, snapshot, start, TokenKind::starts_item),
            };
            children.push(Child::plain(item));
        }
        let end = u32::try_from(self.source.len()).unwrap_or(u32::MAX);
        self.builder
            .push(NodeKind::SourceFile, tolk_ir::Span::new(0, end), children)
    }

    fn parse_item(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let annotations = if self.check(TokenKind::At) {
            Some(self.parse_annotations()?)
        } else {
            None
        };

        match self.current_kind() {
            TokenKind::Import => self.parse_import(start),
            TokenKind::Fun => self.parse_function(start, annotations, false),
            TokenKind::Ident if self.check_word("get") && self.cursor.peek_kind(1) == TokenKind::Fun => {
                self.cursor.advance();
                self.parse_function(start, annotations, true)
            }
            TokenKind::Struct => self.parse_struct(start, annotations),
            TokenKind::Enum => self.parse_enum(start, annotations),
            TokenKind::Type => self.parse_type_alias(start, annotations),
            TokenKind::Const => self.parse_constant(start, annotations),
            TokenKind::Global => self.parse_global(start, annotations),
            _ => Err(self.error_expected("declaration")),
        }
    }

    /// `@name` or `@name(args)`, one or more.
    fn parse_annotations(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let mut annotations = Vec::new();
        while self.check(TokenKind::At) {
            let annotation_start = self.start();
            self.cursor.advance();
            let name = self.expect_name(NodeKind::Identifier)?;
            let mut children = vec![Child::labeled(FieldName::Name, name)];
            if self.check(TokenKind::LParen) {
                let arguments = self.parse_argument_list()?;
                children.push(Child::labeled(FieldName::Arguments, arguments));
            }
            annotations.push(Child::plain(self.finish(
                NodeKind::Annotation,
                annotation_start,
                children,
            )));
        }
        Ok(self.finish(NodeKind::AnnotationList, start, annotations))
    }

    fn parse_import(&mut self, start: u32) -> PResult<NodeId> {
        self.expect(TokenKind::Import)?;
        if !self.check(TokenKind::String) {
            return Err(self.error_expected("import path"));
        }
        let path = self.leaf(NodeKind::StringLiteral);
        self.eat(TokenKind::Semi);
        Ok(self.finish(
            NodeKind::ImportDirective,
            start,
            [Child::labeled(FieldName::Path, path)],
        ))
    }

    /// `fun name`, `fun Receiver.name` or (after `get`) `get fun name`.
    fn parse_function(
        &mut self,
        start: u32,
        annotations: Option<NodeId>,
        is_get_method: bool,
    ) -> PResult<NodeId> {
        self.expect(TokenKind::Fun)?;
        let mut children: Vec<Child> = annotations
            .map(|list| Child::labeled(FieldName::Annotations, list))
            .into_iter()
            .collect();

        let receiver = if is_get_method {
            None
        } else {
            self.try_parse_receiver()
        };
        let kind = match (is_get_method, receiver) {
            (true, _) => NodeKind::GetMethodDeclaration,
            (false, Some(receiver)) => {
                children.push(Child::labeled(FieldName::Receiver, receiver));
                NodeKind::MethodDeclaration
            }
            (false, None) => NodeKind::FunctionDeclaration,
        };

        let name = self.expect_name(NodeKind::Identifier)?;
        children.push(Child::labeled(FieldName::Name, name));
        if self.check(TokenKind::Lt) {
            let params = self.parse_type_parameter_list()?;
            children.push(Child::labeled(FieldName::TypeParameters, params));
        }
        let params = self.parse_parameter_list()?;
        children.push(Child::labeled(FieldName::Parameters, params));
        if self.eat(TokenKind::Colon) {
            let return_type = self.parse_type()?;
            children.push(Child::labeled(FieldName::ReturnType, return_type));
        }

        if self.check(TokenKind::LBrace) {
            let body = self.parse_block()?;
            children.push(Child::labeled(FieldName::Body, body));
        } else if self.check_word("asm") {
            let body_start = self.start();
            self.cursor.advance();
            let mut strings = Vec::new();
            while self.check(TokenKind::String) {
                strings.push(Child::plain(self.leaf(NodeKind::StringLiteral)));
            }
            let body = self.finish(NodeKind::AsmBody, body_start, strings);
            children.push(Child::labeled(FieldName::Body, body));
            self.eat(TokenKind::Semi);
        } else if self.check_word("builtin") {
            let body = self.leaf(NodeKind::BuiltinSpecifier);
            children.push(Child::labeled(FieldName::Body, body));
            self.eat(TokenKind::Semi);
        } else {
            return Err(self.error_expected("function body"));
        }

        Ok(self.finish(kind, start, children))
    }

    /// A receiver is a type followed by `.`; anything else is rolled back.
    fn try_parse_receiver(&mut self) -> Option<NodeId> {
        let start = self.start();
        let receiver_type = self.try_parse(Self::parse_type, |p| p.check(TokenKind::Dot))?;
        self.cursor.advance();
        // The receiver node ends before the dot.
        let end = self.builder.span(receiver_type).end;
        Some(self.builder.push(
            NodeKind::MethodReceiver,
            tolk_ir::Span::new(start, end),
            [Child::labeled(FieldName::ReceiverType, receiver_type)],
        ))
    }

    fn parse_parameter_list(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) {
            params.push(Child::plain(self.parse_parameter()?));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(self.finish(NodeKind::ParameterList, start, params))
    }

    fn parse_parameter(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let mut children = Vec::new();
        if self.check_word("mutate") && self.cursor.peek_kind(1) == TokenKind::Ident {
            let mutate = self.leaf(NodeKind::Mutate);
            children.push(Child::labeled(FieldName::Mutate, mutate));
        }
        let name = self.expect_name(NodeKind::Identifier)?;
        children.push(Child::labeled(FieldName::Name, name));
        if self.eat(TokenKind::Colon) {
            let ty = self.parse_type()?;
            children.push(Child::labeled(FieldName::Type, ty));
        }
        if self.eat(TokenKind::Eq) {
            let default = self.parse_expression()?;
            children.push(Child::labeled(FieldName::Default, default));
        }
        Ok(self.finish(NodeKind::ParameterDeclaration, start, children))
    }

    /// `<T, U = int>`
    fn parse_type_parameter_list(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect(TokenKind::Lt)?;
        let mut params = Vec::new();
        while !self.check(TokenKind::Gt) {
            let param_start = self.start();
            let name = self.expect_name(NodeKind::Identifier)?;
            let mut children = vec![Child::labeled(FieldName::Name, name)];
            if self.eat(TokenKind::Eq) {
                let default = self.parse_type()?;
                children.push(Child::labeled(FieldName::Default, default));
            }
            params.push(Child::plain(self.finish(
                NodeKind::TypeParameter,
                param_start,
                children,
            )));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Gt)?;
        Ok(self.finish(NodeKind::TypeParameterList, start, params))
    }

    /// `struct (0x01) Name<T> { field: T, ... }`
    fn parse_struct(&mut self, start: u32, annotations: Option<NodeId>) -> PResult<NodeId> {
        self.expect(TokenKind::Struct)?;
        let mut children: Vec<Child> = annotations
            .map(|list| Child::labeled(FieldName::Annotations, list))
            .into_iter()
            .collect();
        if self.eat(TokenKind::LParen) {
            if !self.check(TokenKind::Number) {
                return Err(self.error_expected("pack prefix"));
            }
            let prefix = self.leaf(NodeKind::NumberLiteral);
            children.push(Child::labeled(FieldName::PackPrefix, prefix));
            self.expect(TokenKind::RParen)?;
        }
        let name = self.expect_name(NodeKind::Identifier)?;
        children.push(Child::labeled(FieldName::Name, name));
        if self.check(TokenKind::Lt) {
            let params = self.parse_type_parameter_list()?;
            children.push(Child::labeled(FieldName::TypeParameters, params));
        }

        let body_start = self.start();
        self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.cursor.is_at_end() {
            fields.push(Child::plain(self.parse_struct_field()?));
            while self.eat(TokenKind::Comma) || self.eat(TokenKind::Semi) {}
        }
        self.expect(TokenKind::RBrace)?;
        let body = self.finish(NodeKind::StructBody, body_start, fields);
        children.push(Child::labeled(FieldName::Body, body));
        Ok(self.finish(NodeKind::StructDeclaration, start, children))
    }

    fn parse_struct_field(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let mut children = Vec::new();
        while (self.check_word("readonly") || self.check_word("private"))
            && self.cursor.peek_kind(1) == TokenKind::Ident
        {
            let modifier = self.leaf(NodeKind::FieldModifier);
            children.push(Child::labeled(FieldName::Modifiers, modifier));
        }
        let name = self.expect_name(NodeKind::Identifier)?;
        children.push(Child::labeled(FieldName::Name, name));
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        children.push(Child::labeled(FieldName::Type, ty));
        if self.eat(TokenKind::Eq) {
            let default = self.parse_expression()?;
            children.push(Child::labeled(FieldName::Default, default));
        }
        Ok(self.finish(NodeKind::StructFieldDeclaration, start, children))
    }

    /// `enum Color: int8 { Red, Green = 2 }`
    fn parse_enum(&mut self, start: u32, annotations: Option<NodeId>) -> PResult<NodeId> {
        self.expect(TokenKind::Enum)?;
        let mut children: Vec<Child> = annotations
            .map(|list| Child::labeled(FieldName::Annotations, list))
            .into_iter()
            .collect();
        let name = self.expect_name(NodeKind::Identifier)?;
        children.push(Child::labeled(FieldName::Name, name));
        if self.eat(TokenKind::Colon) {
            let backed = self.parse_type()?;
            children.push(Child::labeled(FieldName::BackedType, backed));
        }

        let body_start = self.start();
        self.expect(TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.cursor.is_at_end() {
            let member_start = self.start();
            let member_name = self.expect_name(NodeKind::Identifier)?;
            let mut member = vec![Child::labeled(FieldName::Name, member_name)];
            if self.eat(TokenKind::Eq) {
                let value = self.parse_expression()?;
                member.push(Child::labeled(FieldName::Value, value));
            }
            members.push(Child::plain(self.finish(
                NodeKind::EnumMemberDeclaration,
                member_start,
                member,
            )));
            while self.eat(TokenKind::Comma) || self.eat(TokenKind::Semi) {}
        }
        self.expect(TokenKind::RBrace)?;
        let body = self.finish(NodeKind::EnumBody, body_start, members);
        children.push(Child::labeled(FieldName::Body, body));
        Ok(self.finish(NodeKind::EnumDeclaration, start, children))
    }

    /// `type Name<T> = Type;` or `type Name = builtin;`
    fn parse_type_alias(&mut self, start: u32, annotations: Option<NodeId>) -> PResult<NodeId> {
        self.expect(TokenKind::Type)?;
        let mut children: Vec<Child> = annotations
            .map(|list| Child::labeled(FieldName::Annotations, list))
            .into_iter()
            .collect();
        let name = self.expect_name(NodeKind::Identifier)?;
        children.push(Child::labeled(FieldName::Name, name));
        if self.check(TokenKind::Lt) {
            let params = self.parse_type_parameter_list()?;
            children.push(Child::labeled(FieldName::TypeParameters, params));
        }
        self.expect(TokenKind::Eq)?;
        let underlying = if self.check_word("builtin")
            && matches!(self.cursor.peek_kind(1), TokenKind::Semi | TokenKind::Eof)
        {
            self.leaf(NodeKind::BuiltinSpecifier)
        } else {
            self.parse_type()?
        };
        children.push(Child::labeled(FieldName::UnderlyingType, underlying));
        self.eat(TokenKind::Semi);
        Ok(self.finish(NodeKind::TypeAliasDeclaration, start, children))
    }

    /// `const NAME: Type = value;`
    fn parse_constant(&mut self, start: u32, annotations: Option<NodeId>) -> PResult<NodeId> {
        self.expect(TokenKind::Const)?;
        let mut children: Vec<Child> = annotations
            .map(|list| Child::labeled(FieldName::Annotations, list))
            .into_iter()
            .collect();
        let name = self.expect_name(NodeKind::Identifier)?;
        children.push(Child::labeled(FieldName::Name, name));
        if self.eat(TokenKind::Colon) {
            let ty = self.parse_type()?;
            children.push(Child::labeled(FieldName::Type, ty));
        }
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expression()?;
        children.push(Child::labeled(FieldName::Value, value));
        self.eat(TokenKind::Semi);
        Ok(self.finish(NodeKind::ConstantDeclaration, start, children))
    }

    /// `global name: Type;`
    fn parse_global(&mut self, start: u32, annotations: Option<NodeId>) -> PResult<NodeId> {
        self.expect(TokenKind::Global)?;
        let mut children: Vec<Child> = annotations
            .map(|list| Child::labeled(FieldName::Annotations, list))
            .into_iter()
            .collect();
        let name = self.expect_name(NodeKind::Identifier)?;
        children.push(Child::labeled(FieldName::Name, name));
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        children.push(Child::labeled(FieldName::Type, ty));
        self.eat(TokenKind::Semi);
        Ok(self.finish(NodeKind::GlobalVarDeclaration, start, children))
    }
}
