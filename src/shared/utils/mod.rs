use crate::shared::errors::{AppError, AppResult};
use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;

/// 日付文字列（YYYY-MM-DD）を暦日に変換する
///
/// # 引数
/// * `date_str` - 日付文字列（YYYY-MM-DD形式）
///
/// # 戻り値
/// 暦日、または形式が正しくない場合はバリデーションエラー
///
/// # 注意
/// 時刻やタイムゾーンは扱わない。範囲比較はすべて暦日同士で行うため、
/// 終了日を含む・含まないが時刻によって変わることはない。
pub fn parse_iso_date(date_str: &str) -> AppResult<NaiveDate> {
    let trimmed = date_str.trim();
    // "2024-01-05T00:00:00" のような日時文字列は日付部分のみを使用する
    let date_part = trimmed.get(..10).unwrap_or(trimmed);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| {
        AppError::validation(format!(
            "日付はYYYY-MM-DD形式で入力してください: {date_str}"
        ))
    })
}

/// 集計用の月キー（YYYY-MM）を取得
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// 今日の日付（ローカルタイム基準）
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// 金額のバリデーション
///
/// # 引数
/// * `value` - 金額
///
/// # 戻り値
/// 有効な金額の場合はOk(())、無効な場合はエラー
///
/// # バリデーション規則
/// - 0より大きいこと
/// - 小数点以下は2桁まで
pub fn validate_amount(value: Decimal) -> AppResult<()> {
    if value <= Decimal::ZERO {
        return Err(AppError::validation("金額は0より大きい必要があります"));
    }

    if value.normalize().scale() > 2 {
        return Err(AppError::validation(
            "金額は小数点以下2桁まで入力してください",
        ));
    }

    Ok(())
}

/// 文字列の長さバリデーション
///
/// # 引数
/// * `text` - 検証対象の文字列
/// * `max_length` - 最大文字数
/// * `field_name` - フィールド名（エラーメッセージ用）
pub fn validate_text_length(text: &str, max_length: usize, field_name: &str) -> AppResult<()> {
    let char_count = text.chars().count();
    if char_count > max_length {
        return Err(AppError::validation(format!(
            "{field_name}は{max_length}文字以内で入力してください（現在: {char_count}文字）"
        )));
    }
    Ok(())
}

/// 必須フィールドのバリデーション
///
/// # 引数
/// * `text` - 検証対象の文字列
/// * `field_name` - フィールド名（エラーメッセージ用）
pub fn validate_required_field(text: &str, field_name: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::validation(format!("{field_name}は必須項目です")));
    }
    Ok(())
}

/// 文字列の正規化（前後の空白を削除）
pub fn normalize_string(text: &str) -> String {
    text.trim().to_string()
}
