use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240201_000001_create_customers_table::Migration),
            Box::new(m20240201_000002_create_vehicles_table::Migration),
            Box::new(m20240201_000003_create_mechanics_table::Migration),
            Box::new(m20240201_000004_create_parts_table::Migration),
            Box::new(m20240201_000005_create_catalog_tables::Migration),
            Box::new(m20240201_000006_create_specialization_tables::Migration),
            Box::new(m20240201_000007_create_service_tickets_table::Migration),
            Box::new(m20240201_000008_create_ticket_detail_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240201_000001_create_customers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240201_000001_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Customers::FirstName).string().not_null())
                        .col(ColumnDef::new(Customers::LastName).string().not_null())
                        .col(ColumnDef::new(Customers::Email).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Address).string().null())
                        .col(ColumnDef::new(Customers::City).string().null())
                        .col(ColumnDef::new(Customers::State).string().null())
                        .col(ColumnDef::new(Customers::PostalCode).string().null())
                        .col(ColumnDef::new(Customers::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_email")
                        .table(Customers::Table)
                        .col(Customers::Email)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
        FirstName,
        LastName,
        Email,
        Phone,
        Address,
        City,
        State,
        PostalCode,
        PasswordHash,
        CreatedAt,
    }
}

mod m20240201_000002_create_vehicles_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240201_000002_create_vehicles_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Vehicles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Vehicles::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Vehicles::CustomerId).big_integer().not_null())
                        .col(ColumnDef::new(Vehicles::Vin).string().not_null())
                        .col(ColumnDef::new(Vehicles::Make).string().not_null())
                        .col(ColumnDef::new(Vehicles::Model).string().not_null())
                        .col(ColumnDef::new(Vehicles::Year).integer().not_null())
                        .col(ColumnDef::new(Vehicles::Color).string().null())
                        .col(ColumnDef::new(Vehicles::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_vehicles_vin")
                        .table(Vehicles::Table)
                        .col(Vehicles::Vin)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_vehicles_customer_id")
                        .table(Vehicles::Table)
                        .col(Vehicles::CustomerId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Vehicles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Vehicles {
        Table,
        Id,
        CustomerId,
        Vin,
        Make,
        Model,
        Year,
        Color,
        CreatedAt,
    }
}

mod m20240201_000003_create_mechanics_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240201_000003_create_mechanics_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Mechanics::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Mechanics::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Mechanics::FullName).string().not_null())
                        .col(ColumnDef::new(Mechanics::Email).string().not_null())
                        .col(ColumnDef::new(Mechanics::Phone).string().null())
                        .col(ColumnDef::new(Mechanics::SalaryCents).big_integer().null())
                        .col(
                            ColumnDef::new(Mechanics::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Mechanics::HiredAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_mechanics_email")
                        .table(Mechanics::Table)
                        .col(Mechanics::Email)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Mechanics::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Mechanics {
        Table,
        Id,
        FullName,
        Email,
        Phone,
        SalaryCents,
        IsActive,
        HiredAt,
    }
}

mod m20240201_000004_create_parts_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240201_000004_create_parts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Parts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Parts::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Parts::PartNumber).string().not_null())
                        .col(ColumnDef::new(Parts::Name).string().not_null())
                        .col(ColumnDef::new(Parts::Description).string().null())
                        .col(ColumnDef::new(Parts::Category).string().null())
                        .col(ColumnDef::new(Parts::Manufacturer).string().null())
                        .col(ColumnDef::new(Parts::Supplier).string().null())
                        .col(
                            ColumnDef::new(Parts::CurrentCostCents)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Parts::QuantityInStock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Parts::ReorderLevel)
                                .integer()
                                .not_null()
                                .default(5),
                        )
                        .col(ColumnDef::new(Parts::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_parts_part_number")
                        .table(Parts::Table)
                        .col(Parts::PartNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_parts_category")
                        .table(Parts::Table)
                        .col(Parts::Category)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Parts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Parts {
        Table,
        Id,
        PartNumber,
        Name,
        Description,
        Category,
        Manufacturer,
        Supplier,
        CurrentCostCents,
        QuantityInStock,
        ReorderLevel,
        CreatedAt,
    }
}

mod m20240201_000005_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240201_000005_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Services::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Services::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Services::Name).string().not_null())
                        .col(ColumnDef::new(Services::Description).string().null())
                        .col(
                            ColumnDef::new(Services::BasePriceCents)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Services::EstimatedMinutes)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Services::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ServicePackages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ServicePackages::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ServicePackages::Name).string().not_null())
                        .col(ColumnDef::new(ServicePackages::Description).string().null())
                        .col(
                            ColumnDef::new(ServicePackages::DiscountPercent)
                                .decimal_len(5, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ServicePackages::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(ServicePackages::RecommendedMileageInterval)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ServicePackages::CreatedAt)
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
                        .name("idx_service_packages_name")
                        .table(ServicePackages::Table)
                        .col(ServicePackages::Name)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ServicePackageItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ServicePackageItems::PackageId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServicePackageItems::ServiceId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServicePackageItems::Quantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(ServicePackageItems::IsOptional)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ServicePackageItems::SequenceOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .primary_key(
                            Index::create()
                                .col(ServicePackageItems::PackageId)
                                .col(ServicePackageItems::ServiceId),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ServicePackageItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ServicePackages::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Services::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Services {
        Table,
        Id,
        Name,
        Description,
        BasePriceCents,
        EstimatedMinutes,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum ServicePackages {
        Table,
        Id,
        Name,
        Description,
        DiscountPercent,
        IsActive,
        RecommendedMileageInterval,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum ServicePackageItems {
        Table,
        PackageId,
        ServiceId,
        Quantity,
        IsOptional,
        SequenceOrder,
    }
}

mod m20240201_000006_create_specialization_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240201_000006_create_specialization_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Specializations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Specializations::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Specializations::Name).string().not_null())
                        .col(ColumnDef::new(Specializations::Description).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_specializations_name")
                        .table(Specializations::Table)
                        .col(Specializations::Name)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(MechanicCertifications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MechanicCertifications::MechanicId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MechanicCertifications::SpecializationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MechanicCertifications::CertifiedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MechanicCertifications::ExpiresAt)
                                .timestamp()
                                .null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(MechanicCertifications::MechanicId)
                                .col(MechanicCertifications::SpecializationId),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MechanicCertifications::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Specializations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Specializations {
        Table,
        Id,
        Name,
        Description,
    }

    #[derive(DeriveIden)]
    enum MechanicCertifications {
        Table,
        MechanicId,
        SpecializationId,
        CertifiedAt,
        ExpiresAt,
    }
}

mod m20240201_000007_create_service_tickets_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240201_000007_create_service_tickets_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ServiceTickets::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ServiceTickets::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ServiceTickets::CustomerId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceTickets::VehicleId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceTickets::Status).string().not_null())
                        .col(
                            ColumnDef::new(ServiceTickets::ProblemDescription)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceTickets::OdometerMiles)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceTickets::Priority)
                                .integer()
                                .not_null()
                                .default(3),
                        )
                        .col(
                            ColumnDef::new(ServiceTickets::OpenedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceTickets::ClosedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_service_tickets_customer_id")
                        .table(ServiceTickets::Table)
                        .col(ServiceTickets::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_service_tickets_status")
                        .table(ServiceTickets::Table)
                        .col(ServiceTickets::Status)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ServiceTickets::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ServiceTickets {
        Table,
        Id,
        CustomerId,
        VehicleId,
        Status,
        ProblemDescription,
        OdometerMiles,
        Priority,
        OpenedAt,
        ClosedAt,
    }
}

mod m20240201_000008_create_ticket_detail_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240201_000008_create_ticket_detail_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TicketLineItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TicketLineItems::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(TicketLineItems::TicketId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TicketLineItems::ServiceId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(TicketLineItems::LineType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TicketLineItems::Description)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TicketLineItems::Quantity)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TicketLineItems::UnitPriceCents)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TicketLineItems::CreatedAt)
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
                        .name("idx_ticket_line_items_ticket_id")
                        .table(TicketLineItems::Table)
                        .col(TicketLineItems::TicketId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TicketPartUsages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TicketPartUsages::TicketId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TicketPartUsages::PartId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TicketPartUsages::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TicketPartUsages::UnitCostCents)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TicketPartUsages::MarkupPercent)
                                .decimal_len(5, 2)
                                .not_null()
                                .default(30),
                        )
                        .col(
                            ColumnDef::new(TicketPartUsages::WarrantyMonths)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(TicketPartUsages::InstalledByMechanicId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(TicketPartUsages::AttachedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(TicketPartUsages::TicketId)
                                .col(TicketPartUsages::PartId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TicketAssignments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TicketAssignments::TicketId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TicketAssignments::MechanicId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TicketAssignments::Role)
                                .string()
                                .not_null()
                                .default("Technician"),
                        )
                        .col(
                            ColumnDef::new(TicketAssignments::MinutesWorked)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(TicketAssignments::AssignedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(TicketAssignments::TicketId)
                                .col(TicketAssignments::MechanicId),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TicketAssignments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TicketPartUsages::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TicketLineItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum TicketLineItems {
        Table,
        Id,
        TicketId,
        ServiceId,
        LineType,
        Description,
        Quantity,
        UnitPriceCents,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum TicketPartUsages {
        Table,
        TicketId,
        PartId,
        Quantity,
        UnitCostCents,
        MarkupPercent,
        WarrantyMonths,
        InstalledByMechanicId,
        AttachedAt,
    }

    #[derive(DeriveIden)]
    enum TicketAssignments {
        Table,
        TicketId,
        MechanicId,
        Role,
        MinutesWorked,
        AssignedAt,
    }
}
