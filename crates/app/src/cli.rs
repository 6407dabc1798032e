use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "gastos", disable_version_flag = true)]
#[command(about = "Keep expense catalogs and dated expenses in sync with the store")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long)]
    pub config: Option<String>,
    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub level: Option<String>,
    /// Override the SQLite database path.
    #[arg(long)]
    pub sqlite: Option<String>,
    /// Override username (password is never read from CLI).
    #[arg(long)]
    pub username: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    User(User),
    /// Print the active rows of a resource.
    List(ListArgs),
    /// Create a category, payment method, place or cost center.
    AddCatalog(AddCatalogArgs),
    /// Rename a catalog row.
    Rename(RenameArgs),
    AddExpense(ExpenseArgs),
    /// Replace every field of an expense.
    UpdateExpense(UpdateExpenseArgs),
    /// Select rows and delete them as one batch.
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
pub struct User {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register an account with the configured password.
    Create(UserCreateArgs),
}

#[derive(Debug, Args)]
pub struct UserCreateArgs {
    #[arg(long)]
    pub username: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CatalogKind {
    Categories,
    PaymentMethods,
    Places,
    CostCenters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Categories,
    PaymentMethods,
    Places,
    CostCenters,
    Expenses,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    pub resource: ResourceKind,
    /// Day of the expenses to list (YYYY-MM-DD). Required for expenses.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct AddCatalogArgs {
    pub resource: CatalogKind,
    #[arg(long)]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    pub resource: CatalogKind,
    #[arg(long)]
    pub id: i64,
    #[arg(long)]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct ExpenseArgs {
    /// Amount in cents.
    #[arg(long)]
    pub amount_minor: i64,
    #[arg(long)]
    pub date: NaiveDate,
    #[arg(long)]
    pub category: i64,
    #[arg(long)]
    pub payment_method: i64,
    #[arg(long)]
    pub place: i64,
    #[arg(long)]
    pub cost_center: i64,
}

#[derive(Debug, Args)]
pub struct UpdateExpenseArgs {
    #[arg(long)]
    pub id: i64,
    #[command(flatten)]
    pub expense: ExpenseArgs,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub resource: ResourceKind,
    /// Day the expenses belong to (YYYY-MM-DD). Required for expenses.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(required = true)]
    pub ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_takes_many_ids() {
        let cli = Cli::try_parse_from(["gastos", "delete", "places", "3", "5"]).unwrap();
        match cli.command {
            Command::Delete(args) => {
                assert_eq!(args.resource, ResourceKind::Places);
                assert_eq!(args.ids, vec![3, 5]);
                assert_eq!(args.date, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn expense_flags_parse_dates() {
        let cli = Cli::try_parse_from([
            "gastos",
            "--username",
            "alice",
            "add-expense",
            "--amount-minor",
            "1250",
            "--date",
            "2026-03-01",
            "--category",
            "1",
            "--payment-method",
            "2",
            "--place",
            "3",
            "--cost-center",
            "4",
        ])
        .unwrap();
        assert_eq!(cli.username.as_deref(), Some("alice"));
        match cli.command {
            Command::AddExpense(args) => {
                assert_eq!(args.amount_minor, 1250);
                assert_eq!(args.date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
                assert_eq!(args.cost_center, 4);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn update_expense_takes_an_id_and_every_field() {
        let cli = Cli::try_parse_from([
            "gastos",
            "update-expense",
            "--id",
            "7",
            "--amount-minor",
            "990",
            "--date",
            "2026-03-02",
            "--category",
            "1",
            "--payment-method",
            "2",
            "--place",
            "3",
            "--cost-center",
            "4",
        ])
        .unwrap();
        match cli.command {
            Command::UpdateExpense(args) => {
                assert_eq!(args.id, 7);
                assert_eq!(args.expense.amount_minor, 990);
                assert_eq!(args.expense.place, 3);
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(
            Cli::try_parse_from([
                "gastos",
                "update-expense",
                "--amount-minor",
                "990",
                "--date",
                "2026-03-02",
                "--category",
                "1",
                "--payment-method",
                "2",
                "--place",
                "3",
                "--cost-center",
                "4",
            ])
            .is_err()
        );
    }

    #[test]
    fn rename_rejects_expenses() {
        assert!(Cli::try_parse_from(["gastos", "rename", "expenses", "--id", "1", "--name", "x"]).is_err());
    }
}
