//! victim 対 adversary の対局 SGF からメタデータを抽出するライブラリ
//!
//! 1 行 1 棋譜の SGF を [`parse_game_str`] に渡すと、対局者・結果・ルール・
//! 学習フェーズなど約 40 フィールドを持つ [`GameInfo`] が得られる。
//! CSV / JSON へは [`GameInfo::to_record`] の順序付きマッピング経由で書き出す。
//!
//! 抽出は副作用のない純関数で、複数スレッドから同時に呼んでよい。

pub mod error;
pub mod parser;
pub mod pattern;
pub mod record;
pub mod types;

pub use error::{GameInfoError, GameInfoResult};
pub use parser::{DEFAULT_ADVERSARY_SUBSTRINGS, DEFAULT_VICTIM_SUBSTRINGS, ParseOptions, parse_game_str};
pub use pattern::{Pattern, extract_first_match, extract_named_param, extract_property};
pub use record::{GameInfo, GameRecord, PassCounts};
pub use types::{Color, FieldValue, PropValue, TrainStatus};
