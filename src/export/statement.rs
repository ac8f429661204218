use crate::export::aggregate::MonthlyAttendance;
use crate::model::month::{YearMonth, is_weekend};
use chrono::Datelike;

pub const TITLE: &str = "ÉTAT POUR SERVIR AU PAIEMENT DES INDEMNITÉS DES STAGIAIRES";
pub const ATTRIBUTION: &str = "Stagiaire";

/// Column index of day 1; day `d` sits at `FIRST_DAY_COLUMN + d - 1`.
pub const FIRST_DAY_COLUMN: usize = 4;

#[derive(Debug, Clone)]
pub struct StatementRow {
    /// Dense, starting at 1, in matricule order.
    pub number: usize,
    pub matricule: String,
    pub full_name: String,
    pub days: Vec<String>,
    pub total: f64,
    pub surface_id: String,
}

impl StatementRow {
    /// The row as printed, left to right.
    pub fn cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(FIRST_DAY_COLUMN + self.days.len() + 2);
        cells.push(self.number.to_string());
        cells.push(self.matricule.clone());
        cells.push(self.full_name.clone());
        cells.push(ATTRIBUTION.to_string());
        cells.extend(self.days.iter().cloned());
        cells.push(format_total(self.total));
        cells.push(self.surface_id.clone());
        cells
    }
}

/// The payment statement for one month, independent of the output format.
#[derive(Debug, Clone)]
pub struct Statement {
    pub month: YearMonth,
    pub title: String,
    pub subtitle: String,
    pub header: Vec<String>,
    pub rows: Vec<StatementRow>,
    /// Day numbers falling on Saturday or Sunday.
    pub weekend_days: Vec<u32>,
    /// Two rows of two cells: place/date line, then the signing offices.
    pub footer: [[String; 2]; 2],
}

impl Statement {
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn weekend_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.weekend_days
            .iter()
            .map(|d| FIRST_DAY_COLUMN + *d as usize - 1)
    }

    pub fn is_weekend_column(&self, column: usize) -> bool {
        self.weekend_columns().any(|c| c == column)
    }

    pub fn file_name(&self, extension: &str) -> String {
        format!(
            "Etat_presences_{:04}_{:02}.{extension}",
            self.month.year(),
            self.month.month()
        )
    }
}

/// Day cell text: `1`, `0.5` or `0`.
pub fn format_presence(value: f64) -> String {
    if value == 1.0 {
        "1".to_string()
    } else if value == 0.5 {
        "0.5".to_string()
    } else {
        "0".to_string()
    }
}

/// Whole totals print without decimals, others with one.
pub fn format_total(total: f64) -> String {
    if total.fract() == 0.0 {
        format!("{}", total as i64)
    } else {
        format!("{total:.1}")
    }
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Interns with nothing recorded for the month are left off the statement.
pub fn build_statement(monthly: &MonthlyAttendance, workplace: &str) -> Statement {
    let month = monthly.month;
    let days_in_month = month.days_in_month();

    let mut header: Vec<String> = ["N°", "MATRICULE", "NOM ET PRÉNOMS", "Attribution"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend((1..=days_in_month).map(|d| d.to_string()));
    header.push("T. Jours".to_string());
    header.push("PAOSITRA MONEY".to_string());

    let rows = monthly
        .interns
        .iter()
        .filter(|row| row.total != 0.0)
        .enumerate()
        .map(|(i, row)| StatementRow {
            number: i + 1,
            matricule: row.intern.matricule.clone(),
            full_name: row.intern.full_name.clone(),
            days: (1..=days_in_month).map(|d| format_presence(row.day(d))).collect(),
            total: row.total,
            surface_id: row.intern.surface_id.clone(),
        })
        .collect();

    let weekend_days = month
        .days()
        .filter(|d| is_weekend(*d))
        .map(|d| d.day())
        .collect();

    Statement {
        month,
        title: TITLE.to_string(),
        subtitle: format!(
            "LIEU DE STAGE PRINCIPAL : {} - {} {}",
            workplace.to_uppercase(),
            month.french_name(),
            month.year()
        ),
        header,
        rows,
        weekend_days,
        footer: [
            [format!("{}, le ___________", title_case(workplace)), String::new()],
            [
                "DIRECTION DES COMPTES POSTAUX".to_string(),
                "CHEF DE CENTRE DE L'ÉPARGNE POSTALE".to_string(),
            ],
        ],
    }
}
