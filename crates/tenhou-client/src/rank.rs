//! Dan/kyu table used for the lobby-entry log line.

/// A rank name and the points needed to promote out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub name: &'static str,
    pub promotion: u32,
}

const fn rank(name: &'static str, promotion: u32) -> Rank {
    Rank { name, promotion }
}

/// Indexed by the rank id the server sends in `PF4`.
pub const RANKS: [Rank; 21] = [
    rank("新人", 20),
    rank("9級", 20),
    rank("8級", 20),
    rank("7級", 20),
    rank("6級", 40),
    rank("5級", 60),
    rank("4級", 80),
    rank("3級", 100),
    rank("2級", 100),
    rank("1級", 100),
    rank("初段", 400),
    rank("二段", 800),
    rank("三段", 1200),
    rank("四段", 1600),
    rank("五段", 2000),
    rank("六段", 2400),
    rank("七段", 2800),
    rank("八段", 3200),
    rank("九段", 3600),
    rank("十段", 4000),
    rank("天鳳位", 0),
];

/// Looks up a rank id; `None` if out of range.
pub fn lookup(id: i64) -> Option<&'static Rank> {
    usize::try_from(id).ok().and_then(|i| RANKS.get(i))
}
