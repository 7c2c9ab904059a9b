//! 正規表現による先頭一致抽出
//!
//! SGF のプロパティは `TAG[value]`、コメント内のパラメータは `name=value` 形式。
//! どちらも 1 棋譜に 1 回しか現れない前提なので、全件走査はせず最初の一致だけを見る。

use regex::Regex;

use crate::types::PropValue;

/// コンパイル済みの抽出パターン（第 1 キャプチャグループを取り出す）
#[derive(Clone, Debug)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let re = Regex::new(pattern)?;
        Ok(Self(re))
    }

    /// `TAG[value]` の value（最初の `]` まで）
    ///
    /// 値中のエスケープされた `]` は扱わない。
    pub fn property(tag: &str) -> Self {
        let re = Regex::new(&format!(r"{}\[([^\]]+)", regex::escape(tag)))
            .expect("escaped property pattern is always valid");
        Self(re)
    }

    /// `name=value` の value（`,` か `]` まで）
    pub fn named_param(name: &str) -> Self {
        let re = Regex::new(&format!(r"{}=([^,\]]+)", regex::escape(name)))
            .expect("escaped parameter pattern is always valid");
        Self(re)
    }

    /// 先頭一致の第 1 グループ。入力が `None` なら `None`。
    #[inline]
    pub fn extract(&self, text: Option<&str>) -> Option<PropValue> {
        extract_first_match(&self.0, text)
    }

    /// 直前の抽出結果（整数化済みかもしれない）に対してさらに抽出する。
    #[inline]
    pub fn extract_from(&self, value: Option<&PropValue>) -> Option<PropValue> {
        let text = value.map(PropValue::to_text);
        self.extract(text.as_deref())
    }
}

/// `re` の最初の一致の第 1 グループを返す。全桁数字なら整数に変換する。
pub fn extract_first_match(re: &Regex, text: Option<&str>) -> Option<PropValue> {
    let caps = re.captures(text?)?;
    let m = caps.get(1)?;
    Some(PropValue::from_capture(m.as_str()))
}

/// `TAG[value]` を 1 回だけ抽出する（パターンは都度コンパイル）。
///
/// ホットパスでは [`Pattern::property`] を使い回すこと。
pub fn extract_property(tag: &str, text: Option<&str>) -> Option<PropValue> {
    Pattern::property(tag).extract(text)
}

/// `name=value` を 1 回だけ抽出する（パターンは都度コンパイル）。
pub fn extract_named_param(name: &str, text: Option<&str>) -> Option<PropValue> {
    Pattern::named_param(name).extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_first_match_coerces_digits() {
        let re = Regex::new(r"v([0-9]+)").unwrap();
        assert_eq!(extract_first_match(&re, Some("2500v3200")), Some(PropValue::Int(3200)));
        assert_eq!(extract_first_match(&re, Some("2500")), None);
        assert_eq!(extract_first_match(&re, None), None);
    }

    #[test]
    fn test_extract_first_match_keeps_first_occurrence() {
        let re = Regex::new(r"x([a-z]+)").unwrap();
        assert_eq!(
            extract_first_match(&re, Some("xabc xdef")),
            Some(PropValue::Text("abc".into()))
        );
    }

    #[test]
    fn test_property_stops_at_first_bracket() {
        let sgf = "(;GM[1]PB[adv-s100-d50]PW[victim]SZ[19]C[a[b]c])";
        assert_eq!(extract_property("PB", Some(sgf)), Some(PropValue::Text("adv-s100-d50".into())));
        assert_eq!(extract_property("SZ", Some(sgf)), Some(PropValue::Int(19)));
        assert_eq!(extract_property("C", Some(sgf)), Some(PropValue::Text("a[b".into())));
        // 空の値は一致しない
        assert_eq!(extract_property("HA", Some("HA[]")), None);
    }

    #[test]
    fn test_named_param_terminators() {
        let comment = "startTurnIdx=12,initTurnNum=3,gtype=normal]";
        assert_eq!(extract_named_param("startTurnIdx", Some(comment)), Some(PropValue::Int(12)));
        assert_eq!(extract_named_param("initTurnNum", Some(comment)), Some(PropValue::Int(3)));
        assert_eq!(extract_named_param("gtype", Some(comment)), Some(PropValue::Text("normal".into())));
        assert_eq!(extract_named_param("missing", Some(comment)), None);
    }

    #[test]
    fn test_extract_from_int_value() {
        // 整数化済みの値も文字列に戻して再抽出できる
        let rank = PropValue::Int(2500);
        let p = Pattern::new(r"(\d{2})").unwrap();
        assert_eq!(p.extract_from(Some(&rank)), Some(PropValue::Int(25)));
        assert_eq!(p.extract_from(None), None);
    }
}
