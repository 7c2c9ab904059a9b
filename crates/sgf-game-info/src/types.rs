//! 抽出結果で使う基本型
//!
//! - [`Color`]: 手番色（`b` / `w`）
//! - [`TrainStatus`]: パスから推定した学習フェーズ
//! - [`PropValue`]: 正規表現キャプチャの値（全桁数字なら整数、それ以外は文字列）
//! - [`FieldValue`]: 出力レコードの 1 フィールド分の値

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::GameInfoError;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// 手番色
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// SGF の慣習に合わせた 1 文字表記
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Black => "b",
            Color::White => "w",
        }
    }

    #[inline]
    pub fn opposite(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// 1 文字目（大文字小文字は問わない）から色を判定する。
    pub fn from_initial(c: char) -> Option<Color> {
        match c.to_ascii_lowercase() {
            'b' => Some(Color::Black),
            'w' => Some(Color::White),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = GameInfoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "black" => Ok(Color::Black),
            "w" | "white" => Ok(Color::White),
            _ => Err(GameInfoError::InvalidColor(s.to_string())),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TrainStatus
// ---------------------------------------------------------------------------

/// 棋譜の出自（パスのディレクトリ名から推定）
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TrainStatus {
    /// `eval/` 配下
    Eval,
    /// `selfplay/` 配下
    Train,
    /// `gatekeepersgf/` 配下
    Gating,
}

impl TrainStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TrainStatus::Eval => "eval",
            TrainStatus::Train => "train",
            TrainStatus::Gating => "gating",
        }
    }
}

impl Serialize for TrainStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PropValue
// ---------------------------------------------------------------------------

/// 正規表現キャプチャの値。
///
/// キャプチャ全体が ASCII 数字のときだけ整数になる。`i64` に収まらない桁数は
/// 文字列のまま残す（数値変換で失敗させない）。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropValue {
    Int(i64),
    Text(String),
}

impl PropValue {
    pub fn from_capture(s: &str) -> PropValue {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = s.parse::<i64>() {
                return PropValue::Int(n);
            }
        }
        PropValue::Text(s.to_string())
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(n) => Some(*n),
            PropValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Int(_) => None,
            PropValue::Text(s) => Some(s),
        }
    }

    /// フォールバック連鎖で「値あり」とみなすか。`0` と空文字列は偽。
    pub fn is_truthy(&self) -> bool {
        match self {
            PropValue::Int(n) => *n != 0,
            PropValue::Text(s) => !s.is_empty(),
        }
    }

    /// 後段の正規表現にかけるための文字列表現
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Int(n) => write!(f, "{n}"),
            PropValue::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for PropValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropValue::Int(n) => serializer.serialize_i64(*n),
            PropValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// 出力レコードの値
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// CSV 向けの表記。null は空文字列、浮動小数は常に小数点付き（`-7.0`）。
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Int(n) => write!(f, "{n}"),
            FieldValue::Float(x) => write!(f, "{x:?}"),
            FieldValue::Str(s) => f.write_str(s),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Int(n) => serializer.serialize_i64(*n),
            FieldValue::Float(x) => serializer.serialize_f64(*x),
            FieldValue::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

impl From<Color> for FieldValue {
    fn from(v: Color) -> Self {
        FieldValue::Str(v.as_str().to_string())
    }
}

impl From<TrainStatus> for FieldValue {
    fn from(v: TrainStatus) -> Self {
        FieldValue::Str(v.as_str().to_string())
    }
}

impl From<PropValue> for FieldValue {
    fn from(v: PropValue) -> Self {
        match v {
            PropValue::Int(n) => FieldValue::Int(n),
            PropValue::Text(s) => FieldValue::Str(s),
        }
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prop_value_from_capture() {
        assert_eq!(PropValue::from_capture("3200"), PropValue::Int(3200));
        assert_eq!(PropValue::from_capture("-1"), PropValue::Text("-1".into()));
        assert_eq!(PropValue::from_capture("7.5"), PropValue::Text("7.5".into()));
        assert_eq!(PropValue::from_capture("100m"), PropValue::Text("100m".into()));
        // i64 に収まらない桁数は文字列のまま
        let huge = "99999999999999999999999";
        assert_eq!(PropValue::from_capture(huge), PropValue::Text(huge.into()));
    }

    #[test]
    fn test_truthiness() {
        assert!(!PropValue::Int(0).is_truthy());
        assert!(PropValue::Int(5).is_truthy());
        assert!(PropValue::Text("-1".into()).is_truthy());
        assert!(!PropValue::Text(String::new()).is_truthy());
    }

    #[test]
    fn test_color_parse() {
        assert_eq!("b".parse::<Color>().unwrap(), Color::Black);
        assert_eq!("W".parse::<Color>().unwrap(), Color::White);
        assert!(matches!("x".parse::<Color>(), Err(GameInfoError::InvalidColor(_))));
        assert_eq!(Color::Black.opposite(), Color::White);
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Null.to_string(), "");
        assert_eq!(FieldValue::Float(-7.0).to_string(), "-7.0");
        assert_eq!(FieldValue::Float(3.5).to_string(), "3.5");
        assert_eq!(FieldValue::Bool(true).to_string(), "true");
        assert_eq!(FieldValue::from(Some(Color::White)).to_string(), "w");
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
    }
}
