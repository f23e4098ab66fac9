use std::fmt;

const RECURRING_PAYMENTS_SQL: &str = r#"
ALTER TABLE "colibrrri_subscriptions"
ADD COLUMN IF NOT EXISTS "isRecurring" BOOLEAN DEFAULT false,
ADD COLUMN IF NOT EXISTS "recurringToken" TEXT,
ADD COLUMN IF NOT EXISTS "recurringMode" TEXT,
ADD COLUMN IF NOT EXISTS "nextPaymentDate" TIMESTAMP(3),
ADD COLUMN IF NOT EXISTS "lastPaymentDate" TIMESTAMP(3),
ADD COLUMN IF NOT EXISTS "failedPaymentAttempts" INTEGER DEFAULT 0,
ADD COLUMN IF NOT EXISTS "maxFailedAttempts" INTEGER DEFAULT 3;
"#;

const RECURRING_PAYMENTS_VERIFICATION: &str = "SELECT column_name FROM information_schema.columns
WHERE table_name = 'colibrrri_subscriptions'
AND column_name LIKE '%recurring%' OR column_name LIKE '%Payment%' OR column_name LIKE '%failed%';";

const RECURRING_PAYMENTS_COLUMNS: &[&str] = &[
    "isRecurring",
    "recurringToken",
    "recurringMode",
    "nextPaymentDate",
    "lastPaymentDate",
    "failedPaymentAttempts",
    "maxFailedAttempts",
];

/// The migration the runbook is about. It is never executed here,
/// only displayed for an operator to run by hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigrationStatement {
    table: &'static str,
    columns: &'static [&'static str],
    sql: &'static str,
    verification: &'static str,
}

impl MigrationStatement {
    /// The statement adding the recurring payment columns to the subscriptions table
    pub fn recurring_payments() -> MigrationStatement {
        MigrationStatement {
            table: "colibrrri_subscriptions",
            columns: RECURRING_PAYMENTS_COLUMNS,
            sql: RECURRING_PAYMENTS_SQL,
            verification: RECURRING_PAYMENTS_VERIFICATION,
        }
    }

    pub fn table(&self) -> &str {
        self.table
    }

    pub fn columns(&self) -> &[&str] {
        self.columns
    }

    /// The statement, without surrounding whitespace
    pub fn sql(&self) -> &str {
        self.sql.trim()
    }

    /// Query listing the added columns once the statement has been applied
    pub fn verification_query(&self) -> &str {
        self.verification
    }
}

impl Default for MigrationStatement {
    fn default() -> MigrationStatement {
        MigrationStatement::recurring_payments()
    }
}

impl fmt::Display for MigrationStatement {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.sql())
    }
}
