//! pt-BR formatting of money and dates.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const CURRENCY_SYMBOL: &str = "R$";

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Formats `value` as Brazilian reais with two decimals and `.` thousands separators, e.g.
/// `R$ 1.234,56` or `-R$ 10,00`.
pub fn brl(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let en = format_num::format_num!(",.2", rounded.abs().to_f64().unwrap_or_default());
    // format_num groups the en-US way; swap the separators for pt-BR.
    let pt: String = en
        .chars()
        .map(|c| match c {
            ',' => '.',
            '.' => ',',
            other => other,
        })
        .collect();
    format!("{sign}{CURRENCY_SYMBOL} {pt}")
}

/// The pt-BR name of the month of `date`.
pub fn month_name(date: NaiveDate) -> &'static str {
    MONTHS[date.month0() as usize]
}

/// `12 de janeiro`
pub fn day_month(date: NaiveDate) -> String {
    format!("{} de {}", date.day(), month_name(date))
}

/// `10 de janeiro de 2023`
pub fn long_date(date: NaiveDate) -> String {
    format!("{} de {}", day_month(date), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_brl_grouping() {
        assert_eq!(brl(d("1000")), "R$ 1.000,00");
        assert_eq!(brl(d("300")), "R$ 300,00");
        assert_eq!(brl(d("1234567.891")), "R$ 1.234.567,89");
        assert_eq!(brl(d("0")), "R$ 0,00");
        assert_eq!(brl(d("0.5")), "R$ 0,50");
    }

    #[test]
    fn test_brl_negative() {
        assert_eq!(brl(d("-700")), "-R$ 700,00");
        assert_eq!(brl(d("-0.001")), "R$ 0,00");
    }

    #[test]
    fn test_dates() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 12).unwrap();
        assert_eq!(day_month(date), "12 de janeiro");
        assert_eq!(long_date(date), "12 de janeiro de 2023");
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(day_month(date), "1 de março");
    }
}
