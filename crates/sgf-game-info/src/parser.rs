//! SGF 1 行（= 1 棋譜）からのメタデータ抽出
//!
//! SGF の木構造は解釈しない。必要なプロパティを正規表現で 1 回ずつ拾い、
//! 対局者名から victim / adversary の色を推定して派生フィールドを組み立てる。
//!
//! # 例
//!
//! ```
//! use sgf_game_info::{Color, ParseOptions, parse_game_str};
//!
//! let sgf = "(;GM[1]SZ[19]KM[6.5]PB[adv-s100-d50]PW[victim]RE[B+3.5];B[dd];W[pp])";
//! let info = parse_game_str("runs/eval/a.sgfs", 1, sgf, &ParseOptions::default()).unwrap();
//! assert_eq!(info.victim_color, Some(Color::White));
//! assert_eq!(info.adv_minus_victim_score, Some(3.5));
//! ```

use std::path::{Component, Path};
use std::sync::LazyLock;

use crate::error::{GameInfoError, GameInfoResult};
use crate::pattern::Pattern;
use crate::record::{GameInfo, PassCounts};
use crate::types::{Color, PropValue, TrainStatus};

// =============================================================================
// 定数定義
// =============================================================================

/// PB / PW に含まれていたら adversary とみなす部分文字列
pub const DEFAULT_ADVERSARY_SUBSTRINGS: &[&str] = &["adv"];

/// PB / PW に含まれていたら victim とみなす部分文字列
pub const DEFAULT_VICTIM_SUBSTRINGS: &[&str] = &["victim", "bot"];

/// 名前からステップ数を読めない旧 victim ボットの学習ステップ数
const LEGACY_VICTIM_STEPS: &[(&str, i64)] = &[
    ("bot-cp127-v1", 5_303_129_600),
    ("bot-cp505-v2", 11_840_935_168),
    ("bot-cp505-v1", 11_840_935_168),
];

/// `tt` による旧式パス表記が有効な最大盤サイズ
const TT_PASS_MAX_BOARD_SIZE: i64 = 19;

/// 抽出に使う正規表現一式
struct SgfPatterns {
    // プロパティ
    rules: Pattern,
    comment: Pattern,
    board_size: Pattern,
    black_name: Pattern,
    white_name: Pattern,
    result: Pattern,
    komi: Pattern,
    black_rank: Pattern,
    white_rank: Pattern,
    handicap: Pattern,
    // ランク文字列
    visits: Pattern,
    visits_eq: Pattern,
    rsym: Pattern,
    algo: Pattern,
    // 名前・パス
    victim_steps: Pattern,
    victim_steps_in_path: Pattern,
    adv_steps: Pattern,
    adv_steps_in_path: Pattern,
    adv_samples: Pattern,
    // ルール文字列
    ko_rule: Pattern,
    score_rule: Pattern,
    tax_rule: Pattern,
    sui: Pattern,
    whb: Pattern,
    // コメント
    start_turn_idx: Pattern,
    init_turn_num: Pattern,
    used_initial_position: Pattern,
    gtype: Pattern,
}

impl SgfPatterns {
    fn new() -> Self {
        let re = |p: &str| Pattern::new(p).expect("invalid SgfPatterns pattern");
        Self {
            rules: Pattern::property("RU"),
            comment: Pattern::property("C"),
            board_size: Pattern::property("SZ"),
            black_name: Pattern::property("PB"),
            white_name: Pattern::property("PW"),
            result: Pattern::property("RE"),
            komi: Pattern::property("KM"),
            black_rank: Pattern::property("BR"),
            white_rank: Pattern::property("WR"),
            handicap: Pattern::property("HA"),
            visits: re(r"v([0-9]+)"),
            visits_eq: re(r"v=([0-9]+)"),
            rsym: Pattern::named_param("rsym"),
            algo: Pattern::named_param("algo"),
            // "-s<数字>" の後は "-" / "." / 終端（t0-s0-d0, victim-s1m.bin.gz 等）
            victim_steps: re(r"-s(\d+m?)(?:[-.]|$)"),
            victim_steps_in_path: re(r"kata[^_]+?-s([0-9]+)-"),
            adv_steps: re(r"-s([0-9]+)-"),
            adv_steps_in_path: re(r"t0-s([0-9]+)-"),
            adv_samples: re(r"-d([0-9]+)"),
            ko_rule: re(r"ko([A-Z]+)"),
            score_rule: re(r"score([A-Z]+)"),
            tax_rule: re(r"tax([A-Z]+)"),
            sui: re(r"sui([0-9])"),
            whb: re(r"whb([A-Z0-9\-]+)"),
            start_turn_idx: Pattern::named_param("startTurnIdx"),
            init_turn_num: Pattern::named_param("initTurnNum"),
            used_initial_position: Pattern::named_param("usedInitialPosition"),
            gtype: Pattern::named_param("gtype"),
        }
    }
}

static PATTERNS: LazyLock<SgfPatterns> = LazyLock::new(SgfPatterns::new);

// =============================================================================
// オプション
// =============================================================================

/// 抽出オプション
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// パス回数など走査コストの高いフィールドを省略する
    pub fast_parse: bool,
    /// PB / PW がラベル付けされていない棋譜向けの victim 色の明示指定
    pub victim_color: Option<Color>,
    /// victim 色が決まらなくてもエラーにしない
    pub no_victim_okay: bool,
    pub adversary_substrings: Vec<String>,
    pub victim_substrings: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            fast_parse: false,
            victim_color: None,
            no_victim_okay: false,
            adversary_substrings: DEFAULT_ADVERSARY_SUBSTRINGS.iter().map(|s| s.to_string()).collect(),
            victim_substrings: DEFAULT_VICTIM_SUBSTRINGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// =============================================================================
// 抽出本体
// =============================================================================

/// SGF 1 行を解析して [`GameInfo`] を返す。
///
/// `path` と `line_number` は出自として記録するだけで、`path` のディレクトリ名は
/// 学習フェーズとステップ数の推定にも使う。
///
/// victim 色が決まらず `no_victim_okay` でもない場合は
/// [`GameInfoError::MissingVictim`]。数値として読めないフィールドは `None` になる。
pub fn parse_game_str(
    path: &str,
    line_number: usize,
    sgf: &str,
    opts: &ParseOptions,
) -> GameInfoResult<GameInfo> {
    let p = &*PATTERNS;
    let text = Some(sgf);

    // 1. プロパティ
    let rule_str = p.rules.extract(text).map(|v| v.to_text());
    let rule = rule_str.as_deref();
    let comment_str = p.comment.extract(text).map(|v| v.to_text());
    let comment = comment_str.as_deref();
    let board_size = p.board_size.extract(text);
    let b_name = p.black_name.extract(text);
    let w_name = p.white_name.extract(text);
    let komi = p.komi.extract(text).and_then(|v| parse_float(&v.to_text()));

    // 2. 結果
    let outcome = p.result.extract(text).map(|v| parse_result(&v.to_text())).unwrap_or_default();

    // 3. ランク文字列と探索 visit 数
    let b_rank = p.black_rank.extract(text);
    let w_rank = p.white_rank.extract(text);
    let b_visits = visits_from_rank(b_rank.as_ref());
    let w_visits = visits_from_rank(w_rank.as_ref());

    // 4. 学習フェーズ
    let parts = path_parts(path);
    let train_status = train_status_from_parts(&parts);
    let path_tail = parts[parts.len().saturating_sub(3)..].join("/");

    // 5. victim 色
    let victim_color = opts
        .victim_color
        .or_else(|| resolve_victim_color(b_name.as_ref(), w_name.as_ref(), opts));
    if victim_color.is_none() {
        if !opts.no_victim_okay {
            return Err(GameInfoError::MissingVictim {
                path: path.to_string(),
                line_number,
            });
        }
        log::debug!("victim color unresolved: path={path}, line_number={line_number}");
    }
    let adv_color = victim_color.map(Color::opposite);

    let by_color = |c: Option<Color>, black: &Option<PropValue>, white: &Option<PropValue>| match c {
        Some(Color::Black) => black.clone(),
        Some(Color::White) => white.clone(),
        None => None,
    };

    // 6. victim / adversary の派生値
    let victim_name = by_color(victim_color, &b_name, &w_name);
    let adv_name = by_color(adv_color, &b_name, &w_name);
    let victim_rank = by_color(victim_color, &b_rank, &w_rank);
    let adv_rank = by_color(adv_color, &b_rank, &w_rank);

    let (victim_steps, adv_steps, adv_samples) = if victim_color.is_some() {
        let victim_steps = legacy_victim_steps(victim_name.as_ref()).or_else(|| {
            first_truthy([
                p.victim_steps.extract_from(victim_name.as_ref()),
                p.victim_steps_in_path.extract(Some(&path_tail)),
            ])
        });
        let adv_steps = first_truthy([
            p.adv_steps.extract_from(adv_name.as_ref()),
            p.adv_steps_in_path.extract(Some(&path_tail)),
        ]);
        let adv_samples = first_truthy([p.adv_samples.extract_from(adv_name.as_ref())]);
        (
            Some(victim_steps.unwrap_or(PropValue::Int(0))),
            Some(adv_steps.unwrap_or(PropValue::Int(0))),
            Some(adv_samples.unwrap_or(PropValue::Int(0))),
        )
    } else {
        (None, None, None)
    };

    let adv_komi = match (adv_color, komi) {
        (Some(Color::White), Some(k)) => Some(k),
        (Some(Color::Black), Some(k)) => Some(-k),
        _ => None,
    };
    let win_side = outcome.win_color.and_then(Color::from_initial);
    let adv_win = adv_color.is_some() && win_side == adv_color;
    let adv_minus_victim_score = match (adv_color, outcome.win_score) {
        (Some(_), Some(score)) if adv_win => Some(score),
        (Some(_), Some(score)) => Some(-score),
        _ => None,
    };
    let adv_minus_victim_score_wo_komi = match (adv_minus_victim_score, adv_komi) {
        (Some(margin), Some(k)) => Some(margin - k),
        _ => None,
    };
    let (win_name, lose_name) = match win_side {
        Some(Color::Black) => (b_name.clone(), w_name.clone()),
        Some(Color::White) => (w_name.clone(), b_name.clone()),
        None => (None, None),
    };

    // 7. ルール文字列とコメント
    let whb = match rule {
        Some(r) if r.contains("whb") => p.whb.extract(rule),
        _ => Some(PropValue::Text("0".to_string())),
    };

    // 9. パス回数
    let pass_counts = if opts.fast_parse {
        None
    } else {
        Some(count_passes(sgf, board_size.as_ref(), adv_color))
    };

    Ok(GameInfo {
        victim_visits: default_visits(by_color(victim_color, &b_visits, &w_visits), victim_rank.as_ref()),
        victim_rsym: p.rsym.extract_from(victim_rank.as_ref()),
        victim_algo: p.algo.extract_from(victim_rank.as_ref()),
        adv_visits: default_visits(by_color(adv_color, &b_visits, &w_visits), adv_rank.as_ref()),
        adv_rsym: p.rsym.extract_from(adv_rank.as_ref()),
        adv_algo: p.algo.extract_from(adv_rank.as_ref()),
        b_name,
        w_name,
        b_visits,
        w_visits,

        victim_color,
        victim_name,
        victim_steps,
        adv_color,
        adv_name,
        adv_steps,
        adv_samples,

        win_color: outcome.win_color,
        win_name,
        lose_name,
        adv_win,
        komi,
        adv_komi,
        adv_minus_victim_score,
        adv_minus_victim_score_wo_komi,

        train_status,
        board_size,
        start_turn_idx: p.start_turn_idx.extract(comment),
        handicap: p.handicap.extract(text),
        // 8. 先頭の ";" はルートノード
        num_moves: sgf.bytes().filter(|&b| b == b';').count() as i64 - 1,
        ko_rule: p.ko_rule.extract(rule),
        score_rule: p.score_rule.extract(rule),
        tax_rule: p.tax_rule.extract(rule),
        sui_legal: p.sui.extract(rule) == Some(PropValue::Int(1)),
        has_button: rule.is_some_and(|r| r.contains("button1")),
        whb,
        fpok: rule.is_some_and(|r| r.contains("fpok")),
        init_turn_num: p.init_turn_num.extract(comment),
        used_initial_position: p.used_initial_position.extract(comment) == Some(PropValue::Int(1)),
        gtype: p.gtype.extract(comment),
        is_continuation: false,
        is_resignation: outcome.is_resignation,

        sgf_path: path.to_string(),
        sgf_line: line_number,
        pass_counts,
    })
}

// =============================================================================
// ヘルパー関数
// =============================================================================

/// RE プロパティの解釈結果
#[derive(Clone, Debug, Default, PartialEq)]
struct Outcome {
    win_color: Option<char>,
    win_score: Option<f64>,
    is_resignation: bool,
}

/// `B+3.5` / `W+Resign` / `B 3.5`（手動対局の旧形式）を解釈する。
fn parse_result(result: &str) -> Outcome {
    let win_color = result.chars().next().map(|c| c.to_ascii_lowercase());
    let score_str = if result.contains('+') {
        result.rsplit('+').next()
    } else {
        result.rsplit(' ').next()
    }
    .unwrap_or_default();

    if matches!(score_str, "R" | "Resign") {
        return Outcome {
            win_color,
            win_score: None,
            is_resignation: true,
        };
    }
    Outcome {
        win_color,
        win_score: parse_float(score_str),
        is_resignation: false,
    }
}

/// 読めなければ `None`（例外にしない）
fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

/// ランク文字列から visit 数を読む。`v<数字>` → `v=<数字>` の順に試し、
/// どちらも無ければ文字列 `"-1"`。ランク文字列自体が無ければ `None`。
fn visits_from_rank(rank: Option<&PropValue>) -> Option<PropValue> {
    let rank = rank.filter(|r| r.is_truthy())?;
    let p = &*PATTERNS;
    let visits = first_truthy([p.visits.extract_from(Some(rank)), p.visits_eq.extract_from(Some(rank))]);
    Some(visits.unwrap_or_else(|| PropValue::Text("-1".to_string())))
}

/// visit 数が無ければランク文字列（先頭の `v` を除く）を数値として使い、
/// ランク文字列も無ければ 1。
fn default_visits(visits: Option<PropValue>, rank: Option<&PropValue>) -> Option<PropValue> {
    match (visits, rank) {
        (Some(v), _) if v.is_truthy() => Some(v),
        (_, Some(r)) if r.is_truthy() => {
            r.to_text().trim_start_matches('v').trim().parse::<i64>().ok().map(PropValue::Int)
        }
        _ => Some(PropValue::Int(1)),
    }
}

/// 最初の「真」の値（`0` と空文字列は飛ばす）
fn first_truthy<const N: usize>(candidates: [Option<PropValue>; N]) -> Option<PropValue> {
    candidates.into_iter().flatten().find(PropValue::is_truthy)
}

fn legacy_victim_steps(victim_name: Option<&PropValue>) -> Option<PropValue> {
    let name = victim_name?.as_text()?;
    LEGACY_VICTIM_STEPS
        .iter()
        .find(|(legacy, _)| *legacy == name)
        .map(|(_, steps)| PropValue::Int(*steps))
}

fn path_parts(path: &str) -> Vec<&str> {
    Path::new(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect()
}

/// ディレクトリ名から学習フェーズを推定する（先に一致した規則が優先）。
fn train_status_from_parts(parts: &[&str]) -> Option<TrainStatus> {
    if parts.contains(&"eval") {
        Some(TrainStatus::Eval)
    } else if parts.contains(&"selfplay") {
        Some(TrainStatus::Train)
    } else if parts.contains(&"gatekeepersgf") {
        Some(TrainStatus::Gating)
    } else {
        None
    }
}

/// 対局者名から victim 色を推定する。
///
/// 黒が victim: PB が victim 名 or PW が adversary 名。白はその対称。
/// ちょうど片方だけ成り立つときに限り色を決める（両方・どちらもなしは `None`）。
fn resolve_victim_color(
    b_name: Option<&PropValue>,
    w_name: Option<&PropValue>,
    opts: &ParseOptions,
) -> Option<Color> {
    let b = b_name.map(|n| n.to_text().to_lowercase()).unwrap_or_default();
    let w = w_name.map(|n| n.to_text().to_lowercase()).unwrap_or_default();
    let has_any = |name: &str, subs: &[String]| subs.iter().any(|s| name.contains(&s.to_lowercase()));

    let victim_is_black = has_any(&b, &opts.victim_substrings) || has_any(&w, &opts.adversary_substrings);
    let victim_is_white = has_any(&w, &opts.victim_substrings) || has_any(&b, &opts.adversary_substrings);
    match (victim_is_black, victim_is_white) {
        (true, false) => Some(Color::Black),
        (false, true) => Some(Color::White),
        _ => None,
    }
}

/// 空の `B[]` / `W[]` をパスとして数える。19 路以下では `tt` もパス。
fn count_passes(sgf: &str, board_size: Option<&PropValue>, adv_color: Option<Color>) -> PassCounts {
    let tt_is_pass = board_size
        .and_then(PropValue::as_int)
        .is_some_and(|n| n <= TT_PASS_MAX_BOARD_SIZE);
    let count = |empty: &str, tt: &str| {
        sgf.matches(empty).count() + if tt_is_pass { sgf.matches(tt).count() } else { 0 }
    };
    let num_b_pass = count("B[]", "B[tt]");
    let num_w_pass = count("W[]", "W[tt]");
    let (num_adv_pass, num_victim_pass) = match adv_color {
        Some(Color::Black) => (Some(num_b_pass), Some(num_w_pass)),
        Some(Color::White) => (Some(num_w_pass), Some(num_b_pass)),
        None => (None, None),
    };
    PassCounts {
        num_b_pass,
        num_w_pass,
        num_adv_pass,
        num_victim_pass,
    }
}

// =============================================================================
// テスト
// =============================================================================
