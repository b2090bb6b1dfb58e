//! The entity codec contract

use crate::context::{LoadContext, SaveContext};
use crate::record::Record;
use sortie_shared::Result;
use sortie_table::Table;

/// Conversion between one typed entity and one table record
///
/// `decode` reads the family's discriminator (if any) before the
/// variant-specific fields; `encode` always writes it back, so that
/// `decode(encode(x)) == x`.
pub trait EntityCodec: Sized {
    /// Family name used in diagnostics
    const FAMILY: &'static str;

    fn decode(record: &Record<'_>, ctx: &mut LoadContext<'_>) -> Result<Self>;

    fn encode(&self, ctx: &SaveContext<'_>) -> Result<Table>;
}

/// Decode an integer-keyed collection in key order.
///
/// Broken items are skipped or fail the load according to the context's
/// strictness.
pub fn decode_items<T: EntityCodec>(collection: &Record<'_>, ctx: &mut LoadContext<'_>) -> Result<Vec<T>> {
    let mut items = Vec::new();
    for item in collection.items()? {
        if let Some(value) = ctx.decode_record(|ctx| T::decode(&item, ctx))? {
            items.push(value);
        }
    }
    Ok(items)
}

/// Decode the collection stored under `field`; absent means empty
pub fn decode_field<T: EntityCodec>(
    record: &Record<'_>,
    field: &str,
    ctx: &mut LoadContext<'_>,
) -> Result<Vec<T>> {
    match record.opt_record(field)? {
        Some(collection) => decode_items(&collection, ctx),
        None => Ok(Vec::new()),
    }
}

/// Encode a collection as a contiguous 1-based sequence
pub fn encode_items<T: EntityCodec>(items: &[T], ctx: &SaveContext<'_>) -> Result<Table> {
    let tables = items
        .iter()
        .map(|item| item.encode(ctx))
        .collect::<Result<Vec<Table>>>()?;
    Ok(Table::from_sequence(tables))
}
