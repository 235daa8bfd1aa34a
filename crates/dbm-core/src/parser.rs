//! SQL text parsing for script splitting and read-only detection

use sqlparser::ast::{Expr, Statement};
use sqlparser::dialect::{Dialect as ParserDialect, GenericDialect};
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;

use crate::{DbmError, Result};

/// Parser bound to one engine's grammar
#[derive(Debug)]
pub struct SqlParser {
    dialect: Box<dyn ParserDialect + Send + Sync>,
}

impl SqlParser {
    pub fn new(dialect: impl ParserDialect + Send + Sync + 'static) -> Self {
        Self {
            dialect: Box::new(dialect),
        }
    }

    /// Parser for engines without a dedicated grammar
    pub fn generic() -> Self {
        Self::new(GenericDialect {})
    }

    pub fn parse(&self, sql: &str) -> Result<Vec<Statement>> {
        Parser::parse_sql(self.dialect.as_ref(), sql)
            .map_err(|e| DbmError::Query(format!("Failed to parse SQL: {}", e)))
    }

    /// Parse text that must be exactly one expression, e.g. a column default.
    /// Trailing tokens after the expression are an error.
    pub fn parse_expression(&self, text: &str) -> Result<Expr> {
        let mut parser = Parser::new(self.dialect.as_ref())
            .try_with_sql(text)
            .map_err(|e| DbmError::Query(format!("Failed to parse expression: {}", e)))?;
        let expr = parser
            .parse_expr()
            .map_err(|e| DbmError::Query(format!("Failed to parse expression: {}", e)))?;
        let next = parser.peek_token();
        if next.token != Token::EOF {
            return Err(DbmError::Query(format!(
                "Unexpected {} after expression",
                next.token
            )));
        }
        Ok(expr)
    }

    /// Split a script into individual statements, re-rendered without terminators
    pub fn split_statements(&self, sql: &str) -> Result<Vec<String>> {
        Ok(self.parse(sql)?.iter().map(ToString::to_string).collect())
    }

    /// Whether every statement in `sql` only reads data
    pub fn is_read_only(&self, sql: &str) -> Result<bool> {
        let statements = self.parse(sql)?;
        Ok(!statements.is_empty()
            && statements.iter().all(|stmt| {
                matches!(
                    stmt,
                    Statement::Query(_)
                        | Statement::Explain { .. }
                        | Statement::ExplainTable { .. }
                        | Statement::ShowTables { .. }
                        | Statement::ShowColumns { .. }
                        | Statement::ShowCreate { .. }
                )
            }))
    }
}
