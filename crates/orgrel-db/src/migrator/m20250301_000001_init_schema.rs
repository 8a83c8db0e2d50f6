//! Initial schema: companies, org members and manager edges

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. Create companies table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Company::Table)
                    .if_not_exists()
                    .col(uuid(Company::Id).primary_key())
                    .col(string_len(Company::Name, 255).not_null())
                    .col(
                        timestamp_with_time_zone(Company::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Company::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. Create org_members table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(OrgMember::Table)
                    .if_not_exists()
                    .col(uuid(OrgMember::Id).primary_key())
                    .col(uuid(OrgMember::CompanyId).not_null())
                    .col(string_len(OrgMember::Email, 255).not_null())
                    .col(string_len(OrgMember::Name, 255).null())
                    .col(string_len(OrgMember::Title, 255).null())
                    .col(string_len(OrgMember::Role, 255).null())
                    .col(
                        string_len(OrgMember::MembershipState, 32)
                            .not_null()
                            .default("invited"),
                    )
                    .col(
                        timestamp_with_time_zone(OrgMember::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(OrgMember::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_org_members_company_id")
                            .from(OrgMember::Table, OrgMember::CompanyId)
                            .to(Company::Table, Company::Id)
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
                    .name("idx_org_members_company_email")
                    .table(OrgMember::Table)
                    .col(OrgMember::CompanyId)
                    .col(OrgMember::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. Create manager_edges table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(ManagerEdge::Table)
                    .if_not_exists()
                    .col(uuid(ManagerEdge::MemberId).primary_key())
                    .col(uuid(ManagerEdge::CompanyId).not_null())
                    .col(uuid(ManagerEdge::ManagerId).not_null())
                    .col(
                        timestamp_with_time_zone(ManagerEdge::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_manager_edges_company_id")
                            .from(ManagerEdge::Table, ManagerEdge::CompanyId)
                            .to(Company::Table, Company::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_manager_edges_member_id")
                            .from(ManagerEdge::Table, ManagerEdge::MemberId)
                            .to(OrgMember::Table, OrgMember::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_manager_edges_manager_id")
                            .from(ManagerEdge::Table, ManagerEdge::ManagerId)
                            .to(OrgMember::Table, OrgMember::Id)
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
                    .name("idx_manager_edges_company_id")
                    .table(ManagerEdge::Table)
                    .col(ManagerEdge::CompanyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_manager_edges_manager_id")
                    .table(ManagerEdge::Table)
                    .col(ManagerEdge::ManagerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ManagerEdge::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrgMember::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Company::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Company {
    #[sea_orm(iden = "companies")]
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrgMember {
    #[sea_orm(iden = "org_members")]
    Table,
    Id,
    CompanyId,
    Email,
    Name,
    Title,
    Role,
    MembershipState,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ManagerEdge {
    #[sea_orm(iden = "manager_edges")]
    Table,
    MemberId,
    CompanyId,
    ManagerId,
    CreatedAt,
}
