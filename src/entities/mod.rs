pub mod folio_sequence;
pub mod item;
pub mod item_supplier;
pub mod purchase_order;
pub mod purchase_order_line;
pub mod requisition;
pub mod requisition_line;
pub mod stock_level;
pub mod stock_location;
pub mod stock_move;
pub mod stock_picking;
pub mod supplier;
