//! Order Repositories

mod items;
mod orders;
mod reports;

pub(crate) use items::PgOrderItemsRepository;
pub(crate) use orders::PgOrdersRepository;
pub(crate) use reports::PgOrderReportsRepository;
