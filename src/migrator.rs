use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_catalog_tables::Migration),
            Box::new(m20240301_000002_create_requisitions_table::Migration),
            Box::new(m20240301_000003_create_requisition_lines_table::Migration),
            Box::new(m20240301_000004_create_purchase_order_tables::Migration),
            Box::new(m20240301_000005_create_stock_picking_tables::Migration),
            Box::new(m20240301_000006_create_folio_sequences_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create items table aligned with entities::item Model
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Items::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Items::ItemNumber).string().not_null())
                        .col(ColumnDef::new(Items::Description).string().null())
                        .col(ColumnDef::new(Items::PrimaryUomCode).string().not_null())
                        .col(
                            ColumnDef::new(Items::ListPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Items::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Items::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_item_number")
                        .table(Items::Table)
                        .col(Items::ItemNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            // Create suppliers table aligned with entities::supplier Model
            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Suppliers::Name).string().not_null())
                        .col(ColumnDef::new(Suppliers::Status).text().not_null())
                        .col(ColumnDef::new(Suppliers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Suppliers::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            // Create item_suppliers table (ordered seller list per item)
            manager
                .create_table(
                    Table::create()
                        .table(ItemSuppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ItemSuppliers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ItemSuppliers::ItemId).uuid().not_null())
                        .col(ColumnDef::new(ItemSuppliers::SupplierId).uuid().not_null())
                        .col(
                            ColumnDef::new(ItemSuppliers::Sequence)
                                .integer()
                                .not_null()
                                .default(10),
                        )
                        .col(
                            ColumnDef::new(ItemSuppliers::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_item_suppliers_item_id")
                                .from(ItemSuppliers::Table, ItemSuppliers::ItemId)
                                .to(Items::Table, Items::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_item_suppliers_supplier_id")
                                .from(ItemSuppliers::Table, ItemSuppliers::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_item_suppliers_item_sequence")
                        .table(ItemSuppliers::Table)
                        .col(ItemSuppliers::ItemId)
                        .col(ItemSuppliers::Sequence)
                        .to_owned(),
                )
                .await?;

            // Create stock_locations table
            manager
                .create_table(
                    Table::create()
                        .table(StockLocations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockLocations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockLocations::Code).string().not_null())
                        .col(ColumnDef::new(StockLocations::Name).string().not_null())
                        .col(
                            ColumnDef::new(StockLocations::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_locations_code")
                        .table(StockLocations::Table)
                        .col(StockLocations::Code)
                        .unique()
                        .to_owned(),
                )
                .await?;

            // Create stock_levels table (on-hand per item and location)
            manager
                .create_table(
                    Table::create()
                        .table(StockLevels::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockLevels::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockLevels::ItemId).uuid().not_null())
                        .col(ColumnDef::new(StockLevels::LocationId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockLevels::OnHand)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StockLevels::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockLevels::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_levels_item_id")
                                .from(StockLevels::Table, StockLevels::ItemId)
                                .to(Items::Table, Items::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_levels_location_id")
                                .from(StockLevels::Table, StockLevels::LocationId)
                                .to(StockLocations::Table, StockLocations::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_levels_item_location")
                        .table(StockLevels::Table)
                        .col(StockLevels::ItemId)
                        .col(StockLevels::LocationId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockLevels::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StockLocations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ItemSuppliers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        Id,
        ItemNumber,
        Description,
        PrimaryUomCode,
        ListPrice,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Suppliers {
        Table,
        Id,
        Name,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ItemSuppliers {
        Table,
        Id,
        ItemId,
        SupplierId,
        Sequence,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum StockLocations {
        Table,
        Id,
        Code,
        Name,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum StockLevels {
        Table,
        Id,
        ItemId,
        LocationId,
        OnHand,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_requisitions_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_requisitions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create requisitions table aligned with entities::requisition Model
            manager
                .create_table(
                    Table::create()
                        .table(Requisitions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Requisitions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Requisitions::Folio).string().not_null())
                        .col(ColumnDef::new(Requisitions::WarehouseId).uuid().not_null())
                        .col(ColumnDef::new(Requisitions::ClaimantId).uuid().not_null())
                        .col(ColumnDef::new(Requisitions::ApproverId).uuid().null())
                        .col(ColumnDef::new(Requisitions::Status).text().not_null())
                        .col(
                            ColumnDef::new(Requisitions::DateRequested)
                                .date()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Requisitions::DateRequired).date().null())
                        .col(ColumnDef::new(Requisitions::Reason).text().not_null())
                        .col(ColumnDef::new(Requisitions::ReferenceType).text().null())
                        .col(
                            ColumnDef::new(Requisitions::ReferenceFolio)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Requisitions::DestinationLocationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Requisitions::ShippingType).text().null())
                        .col(ColumnDef::new(Requisitions::ClientId).uuid().null())
                        .col(ColumnDef::new(Requisitions::DeliverTo).string().null())
                        .col(ColumnDef::new(Requisitions::DeliverAddress).string().null())
                        .col(ColumnDef::new(Requisitions::PickingType).string().not_null())
                        .col(
                            ColumnDef::new(Requisitions::Ordered)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Requisitions::Picked)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Requisitions::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Requisitions::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Requisitions::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_requisitions_destination_location_id")
                                .from(Requisitions::Table, Requisitions::DestinationLocationId)
                                .to(StockLocations::Table, StockLocations::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_requisitions_folio")
                        .table(Requisitions::Table)
                        .col(Requisitions::Folio)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_requisitions_status")
                        .table(Requisitions::Table)
                        .col(Requisitions::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_requisitions_claimant_id")
                        .table(Requisitions::Table)
                        .col(Requisitions::ClaimantId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_requisitions_created_at")
                        .table(Requisitions::Table)
                        .col(Requisitions::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Requisitions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Requisitions {
        Table,
        Id,
        Folio,
        WarehouseId,
        ClaimantId,
        ApproverId,
        Status,
        DateRequested,
        DateRequired,
        Reason,
        ReferenceType,
        ReferenceFolio,
        DestinationLocationId,
        ShippingType,
        ClientId,
        DeliverTo,
        DeliverAddress,
        PickingType,
        Ordered,
        Picked,
        Version,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum StockLocations {
        Table,
        Id,
    }
}

mod m20240301_000003_create_requisition_lines_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_requisition_lines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // purchase_order_id / stock_picking_id are lookups into the
            // generated documents, not ownership; deliberately no FK on them.
            manager
                .create_table(
                    Table::create()
                        .table(RequisitionLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RequisitionLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequisitionLines::RequisitionId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequisitionLines::LineNumber)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RequisitionLines::ItemId).uuid().not_null())
                        .col(
                            ColumnDef::new(RequisitionLines::RequestedQty)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(RequisitionLines::OrderedQty)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(RequisitionLines::SourceLocationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequisitionLines::PurchaseOrderId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(RequisitionLines::StockPickingId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(RequisitionLines::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequisitionLines::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_requisition_lines_requisition_id")
                                .from(RequisitionLines::Table, RequisitionLines::RequisitionId)
                                .to(Requisitions::Table, Requisitions::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_requisition_lines_item_id")
                                .from(RequisitionLines::Table, RequisitionLines::ItemId)
                                .to(Items::Table, Items::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_requisition_lines_source_location_id")
                                .from(RequisitionLines::Table, RequisitionLines::SourceLocationId)
                                .to(StockLocations::Table, StockLocations::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_requisition_lines_requisition_id")
                        .table(RequisitionLines::Table)
                        .col(RequisitionLines::RequisitionId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_requisition_lines_item_id")
                        .table(RequisitionLines::Table)
                        .col(RequisitionLines::ItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RequisitionLines::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum RequisitionLines {
        Table,
        Id,
        RequisitionId,
        LineNumber,
        ItemId,
        RequestedQty,
        OrderedQty,
        SourceLocationId,
        PurchaseOrderId,
        StockPickingId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Requisitions {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum StockLocations {
        Table,
        Id,
    }
}

mod m20240301_000004_create_purchase_order_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_purchase_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create purchase_orders table aligned with entities::purchase_order Model
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::PoNumber).string().not_null())
                        .col(ColumnDef::new(PurchaseOrders::SupplierId).uuid().not_null())
                        .col(ColumnDef::new(PurchaseOrders::Origin).string().not_null())
                        .col(ColumnDef::new(PurchaseOrders::PlannedDate).date().null())
                        .col(ColumnDef::new(PurchaseOrders::Status).text().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_orders_supplier_id")
                                .from(PurchaseOrders::Table, PurchaseOrders::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_po_number")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::PoNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_origin")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::Origin)
                        .to_owned(),
                )
                .await?;

            // Create purchase_order_lines table
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrderLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::PurchaseOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::ItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::RequisitionLineId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::UnitPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::UomCode)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_order_lines_purchase_order_id")
                                .from(
                                    PurchaseOrderLines::Table,
                                    PurchaseOrderLines::PurchaseOrderId,
                                )
                                .to(PurchaseOrders::Table, PurchaseOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_order_lines_item_id")
                                .from(PurchaseOrderLines::Table, PurchaseOrderLines::ItemId)
                                .to(Items::Table, Items::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_order_lines_purchase_order_id")
                        .table(PurchaseOrderLines::Table)
                        .col(PurchaseOrderLines::PurchaseOrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_order_lines_requisition_line_id")
                        .table(PurchaseOrderLines::Table)
                        .col(PurchaseOrderLines::RequisitionLineId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrderLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PurchaseOrders {
        Table,
        Id,
        PoNumber,
        SupplierId,
        Origin,
        PlannedDate,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PurchaseOrderLines {
        Table,
        Id,
        PurchaseOrderId,
        ItemId,
        RequisitionLineId,
        Quantity,
        UnitPrice,
        UomCode,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Suppliers {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        Id,
    }
}

mod m20240301_000005_create_stock_picking_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_stock_picking_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create stock_pickings table aligned with entities::stock_picking Model
            manager
                .create_table(
                    Table::create()
                        .table(StockPickings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockPickings::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockPickings::PickingNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockPickings::Origin).string().not_null())
                        .col(ColumnDef::new(StockPickings::SupplierId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockPickings::SourceLocationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockPickings::DestinationLocationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockPickings::ScheduledDate)
                                .date()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(StockPickings::PickingType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockPickings::Status).text().not_null())
                        .col(
                            ColumnDef::new(StockPickings::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockPickings::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_pickings_supplier_id")
                                .from(StockPickings::Table, StockPickings::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_pickings_source_location_id")
                                .from(StockPickings::Table, StockPickings::SourceLocationId)
                                .to(StockLocations::Table, StockLocations::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_pickings_destination_location_id")
                                .from(StockPickings::Table, StockPickings::DestinationLocationId)
                                .to(StockLocations::Table, StockLocations::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_pickings_picking_number")
                        .table(StockPickings::Table)
                        .col(StockPickings::PickingNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_pickings_origin")
                        .table(StockPickings::Table)
                        .col(StockPickings::Origin)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_pickings_status")
                        .table(StockPickings::Table)
                        .col(StockPickings::Status)
                        .to_owned(),
                )
                .await?;

            // Create stock_moves table (exactly one per picking)
            manager
                .create_table(
                    Table::create()
                        .table(StockMoves::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockMoves::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMoves::StockPickingId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMoves::ItemId).uuid().not_null())
                        .col(ColumnDef::new(StockMoves::Quantity).decimal().not_null())
                        .col(ColumnDef::new(StockMoves::UomCode).string().not_null())
                        .col(ColumnDef::new(StockMoves::CreatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_moves_stock_picking_id")
                                .from(StockMoves::Table, StockMoves::StockPickingId)
                                .to(StockPickings::Table, StockPickings::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_moves_item_id")
                                .from(StockMoves::Table, StockMoves::ItemId)
                                .to(Items::Table, Items::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_moves_stock_picking_id")
                        .table(StockMoves::Table)
                        .col(StockMoves::StockPickingId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockMoves::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StockPickings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum StockPickings {
        Table,
        Id,
        PickingNumber,
        Origin,
        SupplierId,
        SourceLocationId,
        DestinationLocationId,
        ScheduledDate,
        PickingType,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum StockMoves {
        Table,
        Id,
        StockPickingId,
        ItemId,
        Quantity,
        UomCode,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Suppliers {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum StockLocations {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        Id,
    }
}

mod m20240301_000006_create_folio_sequences_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_folio_sequences_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(FolioSequences::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FolioSequences::Key)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(FolioSequences::Prefix).string().not_null())
                        .col(
                            ColumnDef::new(FolioSequences::Padding)
                                .integer()
                                .not_null()
                                .default(5),
                        )
                        .col(
                            ColumnDef::new(FolioSequences::NextValue)
                                .big_integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(FolioSequences::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Seed the requisition folio sequence
            manager
                .exec_stmt(
                    Query::insert()
                        .into_table(FolioSequences::Table)
                        .columns([
                            FolioSequences::Key,
                            FolioSequences::Prefix,
                            FolioSequences::Padding,
                            FolioSequences::NextValue,
                            FolioSequences::UpdatedAt,
                        ])
                        .values_panic([
                            "warehouse.req".into(),
                            "WR/".into(),
                            5.into(),
                            1.into(),
                            Expr::current_timestamp().into(),
                        ])
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(FolioSequences::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum FolioSequences {
        Table,
        Key,
        Prefix,
        Padding,
        NextValue,
        UpdatedAt,
    }
}
