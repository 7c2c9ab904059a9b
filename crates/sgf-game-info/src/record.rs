//! 1 棋譜分の抽出結果
//!
//! [`GameInfo`] は型付きの結果、[`GameRecord`] は CSV / JSON 出力用の
//! 「フィールド名 → 値」の順序付きマッピング。

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::types::{Color, FieldValue, PropValue, TrainStatus};

/// パス回数（`fast_parse` 時は計算しない）
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassCounts {
    pub num_b_pass: usize,
    pub num_w_pass: usize,
    /// victim 色が未確定なら `None`
    pub num_adv_pass: Option<usize>,
    pub num_victim_pass: Option<usize>,
}

/// 1 棋譜から抽出したメタデータ
#[derive(Clone, Debug, PartialEq)]
pub struct GameInfo {
    // 対局者
    pub b_name: Option<PropValue>,
    pub w_name: Option<PropValue>,
    pub b_visits: Option<PropValue>,
    pub w_visits: Option<PropValue>,

    // victim
    pub victim_color: Option<Color>,
    pub victim_name: Option<PropValue>,
    pub victim_visits: Option<PropValue>,
    pub victim_steps: Option<PropValue>,
    pub victim_rsym: Option<PropValue>,
    pub victim_algo: Option<PropValue>,

    // adversary
    pub adv_color: Option<Color>,
    pub adv_name: Option<PropValue>,
    pub adv_visits: Option<PropValue>,
    pub adv_steps: Option<PropValue>,
    pub adv_samples: Option<PropValue>,
    pub adv_rsym: Option<PropValue>,
    pub adv_algo: Option<PropValue>,

    // 勝敗・スコア
    /// RE の 1 文字目（小文字化）。`b` / `w` 以外（引き分けの `d` 等）もそのまま残す。
    pub win_color: Option<char>,
    pub win_name: Option<PropValue>,
    pub lose_name: Option<PropValue>,
    pub adv_win: bool,
    pub komi: Option<f64>,
    pub adv_komi: Option<f64>,
    pub adv_minus_victim_score: Option<f64>,
    pub adv_minus_victim_score_wo_komi: Option<f64>,

    // ルール・その他
    pub train_status: Option<TrainStatus>,
    pub board_size: Option<PropValue>,
    pub start_turn_idx: Option<PropValue>,
    pub handicap: Option<PropValue>,
    pub num_moves: i64,
    pub ko_rule: Option<PropValue>,
    pub score_rule: Option<PropValue>,
    pub tax_rule: Option<PropValue>,
    pub sui_legal: bool,
    pub has_button: bool,
    pub whb: Option<PropValue>,
    pub fpok: bool,
    pub init_turn_num: Option<PropValue>,
    pub used_initial_position: bool,
    pub gtype: Option<PropValue>,
    pub is_continuation: bool,
    pub is_resignation: bool,

    // 出自
    pub sgf_path: String,
    pub sgf_line: usize,

    pub pass_counts: Option<PassCounts>,
}

impl GameInfo {
    /// 出力用の順序付きマッピングに変換する。
    pub fn to_record(&self) -> GameRecord {
        let mut r = GameRecord::with_capacity(48);
        r.push("b_name", self.b_name.clone());
        r.push("w_name", self.w_name.clone());
        r.push("b_visits", self.b_visits.clone());
        r.push("w_visits", self.w_visits.clone());

        r.push("victim_color", self.victim_color);
        r.push("victim_name", self.victim_name.clone());
        r.push("victim_visits", self.victim_visits.clone());
        r.push("victim_steps", self.victim_steps.clone());
        r.push("victim_rsym", self.victim_rsym.clone());
        r.push("victim_algo", self.victim_algo.clone());

        r.push("adv_color", self.adv_color);
        r.push("adv_name", self.adv_name.clone());
        r.push("adv_visits", self.adv_visits.clone());
        r.push("adv_steps", self.adv_steps.clone());
        r.push("adv_samples", self.adv_samples.clone());
        r.push("adv_rsym", self.adv_rsym.clone());
        r.push("adv_algo", self.adv_algo.clone());

        r.push("win_color", self.win_color.map(String::from));
        r.push("win_name", self.win_name.clone());
        r.push("lose_name", self.lose_name.clone());
        r.push("adv_win", self.adv_win);
        r.push("komi", self.komi);
        r.push("adv_komi", self.adv_komi);
        r.push("adv_minus_victim_score", self.adv_minus_victim_score);
        r.push("adv_minus_victim_score_wo_komi", self.adv_minus_victim_score_wo_komi);

        r.push("train_status", self.train_status);
        r.push("board_size", self.board_size.clone());
        r.push("start_turn_idx", self.start_turn_idx.clone());
        r.push("handicap", self.handicap.clone());
        r.push("num_moves", self.num_moves);
        r.push("ko_rule", self.ko_rule.clone());
        r.push("score_rule", self.score_rule.clone());
        r.push("tax_rule", self.tax_rule.clone());
        r.push("sui_legal", self.sui_legal);
        r.push("has_button", self.has_button);
        r.push("whb", self.whb.clone());
        r.push("fpok", self.fpok);
        r.push("init_turn_num", self.init_turn_num.clone());
        r.push("used_initial_position", self.used_initial_position);
        r.push("gtype", self.gtype.clone());
        r.push("is_continuation", self.is_continuation);
        r.push("is_resignation", self.is_resignation);

        r.push("sgf_path", self.sgf_path.as_str());
        r.push("sgf_line", self.sgf_line);

        if let Some(pc) = &self.pass_counts {
            r.push("num_b_pass", pc.num_b_pass);
            r.push("num_w_pass", pc.num_w_pass);
            r.push("num_adv_pass", pc.num_adv_pass);
            r.push("num_victim_pass", pc.num_victim_pass);
        }
        r
    }
}

/// フィールド名 → 値 の順序付きマッピング
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameRecord {
    fields: Vec<(&'static str, FieldValue)>,
}

impl GameRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            fields: Vec::with_capacity(cap),
        }
    }

    /// 末尾に追加する。同名フィールドがあれば値だけ置き換える（順序は保つ）。
    pub fn push(&mut self, name: &'static str, value: impl Into<FieldValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| *k == name).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(k, _)| *k)
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<&GameInfo> for GameRecord {
    fn from(info: &GameInfo) -> Self {
        info.to_record()
    }
}

/// JSON ではフィールド順を保ったオブジェクトとして出す
impl Serialize for GameRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
