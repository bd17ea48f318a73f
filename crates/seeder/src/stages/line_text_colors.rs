use async_trait::async_trait;
use model::line::{Color, Direction};

use crate::{
    batch::BatchOperation,
    database::DatabaseTransaction,
    error::{Result, SeedError},
    resolve::Resolver,
    source::RawRow,
    transform,
    validate::{Cell, FieldPolicies},
};

/// `lineid;direction;route_text_color`
pub const COLUMNS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct TextColorRow {
    pub code: u32,
    pub direction: Direction,
    pub text_color: Color,
}

pub fn prepare(row: &RawRow, policies: &FieldPolicies) -> Result<Option<TextColorRow>> {
    row.expect_arity(COLUMNS)?;

    let Some(code) = policies
        .line_variant
        .apply(Cell::of(row, 0, "lineid").numeric_prefix())?
    else {
        return Ok(None);
    };
    let direction = transform::direction_from_label(&row.fields[1]);
    let text_color = Cell::of(row, 2, "route_text_color")
        .optional_hex_color()?
        .unwrap_or_else(Color::white);

    Ok(Some(TextColorRow {
        code,
        direction,
        text_color,
    }))
}

pub struct UpdateLineTextColors {
    resolver: Resolver,
}

impl UpdateLineTextColors {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl<T: DatabaseTransaction + Send> BatchOperation<T> for UpdateLineTextColors {
    type Row = TextColorRow;

    async fn apply(&self, tx: &mut T, row: usize, value: &TextColorRow) -> Result<()> {
        let line_id = self
            .resolver
            .line(tx, row, value.code, value.direction)
            .await?;
        tx.update_line_text_color(&line_id, &value.text_color)
            .await
            .map_err(|source| SeedError::Write { row, source })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_color_is_white() {
        let value = prepare(
            &RawRow::new(2, vec!["12", "Suburb", ""]),
            &FieldPolicies::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(value.code, 12);
        assert_eq!(value.direction, Direction::Suburb);
        assert_eq!(value.text_color, Color::white());
    }

    #[test]
    fn short_hex_text_color_is_expanded() {
        let value = prepare(
            &RawRow::new(2, vec!["7", "City", "#000"]),
            &FieldPolicies::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(value.text_color.to_hex(), "#000000");
    }

    #[test]
    fn malformed_text_color_aborts() {
        let error = prepare(
            &RawRow::new(8, vec!["7", "City", "black"]),
            &FieldPolicies::default(),
        )
        .unwrap_err();
        assert!(matches!(
            error,
            SeedError::InvalidField {
                row: 8,
                field: "route_text_color",
                ..
            }
        ));
    }
}
