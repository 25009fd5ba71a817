//! Static group, generation, and member registry.
//!
//! The catalog is compile-time data behind `'static` shared references, so
//! nothing can mutate it. Runtime enable/disable flags live in
//! [`crate::state`] and only start from the defaults recorded here.

use serde::Serialize;

/// Group id used for legacy entries that predate group prefixes.
pub const DEFAULT_GROUP_ID: &str = "sakurazaka";

/// Name of the generation holding members who have left their group.
pub const GRADUATED_GENERATION: &str = "卒業生";

/// Retired group-id spellings and the id that replaced each one.
pub const RETIRED_GROUP_ALIASES: &[(&str, &str)] = &[("hinata", "hinatazaka")];

/// One idol group member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Member {
    /// Full name; unique within a group.
    pub fullname: &'static str,
    /// Short display name.
    pub shortname: &'static str,
}

/// A recruitment cohort inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Generation {
    /// Display name, unique within a group.
    pub name: &'static str,
    /// Members in display order.
    pub members: &'static [Member],
    /// Catalog default for the runtime enabled flag.
    pub enabled: bool,
}

/// A supported idol group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Group {
    /// Short machine key, also the composite-key prefix.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Generations in display order.
    pub generations: &'static [Generation],
    /// Catalog default for the runtime enabled flag.
    pub enabled: bool,
}

/// Flattened member annotated with its owning group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CatalogMember {
    /// Owning group id.
    pub group_id: &'static str,
    /// Full name.
    pub fullname: &'static str,
    /// Short display name.
    pub shortname: &'static str,
}

impl Group {
    /// Members across every generation, in catalog order.
    pub fn members(self) -> impl Iterator<Item = &'static Member> {
        self.generations.iter().flat_map(|generation| generation.members.iter())
    }

    /// Looks up a generation by name.
    pub fn generation(self, name: &str) -> Option<&'static Generation> {
        self.generations.iter().find(|generation| generation.name == name)
    }

    /// Generation that lists `fullname` as a member.
    pub fn generation_of(self, fullname: &str) -> Option<&'static Generation> {
        self.generations
            .iter()
            .find(|generation| generation.members.iter().any(|m| m.fullname == fullname))
    }

    /// True when `fullname` belongs to this group.
    pub fn has_member(self, fullname: &str) -> bool {
        self.generation_of(fullname).is_some()
    }

    fn annotated_members(self) -> impl Iterator<Item = CatalogMember> {
        let id = self.id;
        self.members().map(move |m| CatalogMember {
            group_id: id,
            fullname: m.fullname,
            shortname: m.shortname,
        })
    }
}

/// Every supported group in display order.
pub fn groups() -> &'static [Group] {
    &GROUPS
}

/// Looks up a group by id.
pub fn group_by_id(group_id: &str) -> Option<&'static Group> {
    GROUPS.iter().find(|g| g.id == group_id)
}

/// All members of all groups, each annotated with its group id.
pub fn all_members() -> Vec<CatalogMember> {
    GROUPS.iter().flat_map(|g| g.annotated_members()).collect()
}

/// Members of one group; empty for an unknown id.
pub fn group_members(group_id: &str) -> Vec<CatalogMember> {
    group_by_id(group_id)
        .map(|g| g.annotated_members().collect())
        .unwrap_or_default()
}

const fn m(fullname: &'static str, shortname: &'static str) -> Member {
    Member {
        fullname,
        shortname,
    }
}

const SAKURAZAKA_GENERATIONS: &[Generation] = &[
    Generation {
        name: "二期生",
        members: &[
            m("井上 梨名", "井上"),
            m("遠藤 光莉", "光莉"),
            m("大園 玲", "大園"),
            m("大沼 晶保", "大沼"),
            m("幸阪 茉里乃", "幸阪"),
            m("武元 唯衣", "武元"),
            m("田村 保乃", "田村"),
            m("藤吉 夏鈴", "藤吉"),
            m("増本 綺良", "増本"),
            m("松田 里奈", "松田"),
            m("森田 ひかる", "森田"),
            m("守屋 麗奈", "守屋"),
            m("山﨑 天", "山﨑"),
        ],
        enabled: true,
    },
    Generation {
        name: "三期生",
        members: &[
            m("石森 璃花", "石森"),
            m("遠藤 理子", "理子"),
            m("小田倉 麗奈", "小田倉"),
            m("小島 凪紗", "小島"),
            m("谷口 愛季", "谷口"),
            m("中嶋 優月", "中嶋"),
            m("的野 美青", "的野"),
            m("向井 純葉", "向井"),
            m("村井 優", "村井"),
            m("村山 美羽", "村山"),
            m("山下 瞳月", "山下"),
        ],
        enabled: true,
    },
    Generation {
        name: "四期生",
        members: &[
            m("浅井 恋乃未", "浅井"),
            m("稲熊 ひな", "稲熊"),
            m("勝又 春", "勝又"),
            m("佐藤 愛桜", "佐藤"),
            m("中川 智尋", "中川"),
            m("松本 和子", "松本"),
            m("目黒 陽色", "目黒"),
            m("山川 宇衣", "山川"),
            m("山田 桃実", "山田"),
        ],
        enabled: true,
    },
    Generation {
        name: GRADUATED_GENERATION,
        members: &[
            m("上村 莉菜", "上村"),
            m("小池 美波", "小池"),
            m("小林 由依", "小林"),
            m("齋藤 冬優花", "齋藤"),
            m("菅井 友香", "菅井"),
            m("土生 瑞穂", "土生"),
            m("原田 葵", "原田"),
            m("渡邉 理佐", "渡邉"),
        ],
        enabled: false,
    },
];

const HINATAZAKA_GENERATIONS: &[Generation] = &[
    Generation {
        name: "二期生",
        members: &[
            m("金村 美玖", "金村"),
            m("小坂 菜緒", "小坂"),
            m("松田 好花", "松田"),
        ],
        enabled: true,
    },
    Generation {
        name: "三期生",
        members: &[
            m("上村 ひなの", "上村"),
            m("髙橋 未来虹", "髙橋"),
            m("森本 茉莉", "森本"),
            m("山口 陽世", "山口"),
        ],
        enabled: true,
    },
    Generation {
        name: "四期生",
        members: &[
            m("石塚 瑶季", "石塚"),
            m("小西 夏菜実", "小西"),
            m("清水 理央", "清水"),
            m("正源司 陽子", "正源司"),
            m("竹内 希来里", "竹内"),
            m("平尾 帆夏", "平尾"),
            m("平岡 海月", "平岡"),
            m("藤嶌 果歩", "藤嶌"),
            m("宮地 すみれ", "宮地"),
            m("山下 葉留花", "山下"),
            m("渡辺 莉奈", "渡辺"),
        ],
        enabled: true,
    },
    Generation {
        name: "五期生",
        members: &[
            m("大田 美月", "大田"),
            m("大野 愛実", "大野"),
            m("片山 紗希", "片山"),
            m("蔵盛 妃那乃", "蔵盛"),
            m("坂井 新奈", "坂井"),
            m("佐藤 優羽", "佐藤"),
            m("下田 衣珠季", "下田"),
            m("高井 俐香", "高井"),
            m("鶴崎 仁香", "鶴崎"),
            m("松尾 桜", "松尾"),
        ],
        enabled: true,
    },
    Generation {
        name: GRADUATED_GENERATION,
        members: &[
            m("加藤 史帆", "加藤"),
            m("河田 陽菜", "河田"),
            m("佐々木 久美", "久美"),
            m("佐々木 美玲", "美玲"),
            m("高本 彩花", "高本"),
            m("東村 芽依", "東村"),
            m("丹生 明里", "丹生"),
            m("濱岸 ひより", "濱岸"),
            m("富田 鈴花", "富田"),
        ],
        enabled: false,
    },
];

static GROUPS: [Group; 2] = [
    Group {
        id: "sakurazaka",
        name: "櫻坂46",
        generations: SAKURAZAKA_GENERATIONS,
        enabled: true,
    },
    Group {
        id: "hinatazaka",
        name: "日向坂46",
        generations: HINATAZAKA_GENERATIONS,
        enabled: true,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graduated_generation_defaults_off_in_every_group() {
        for group in groups() {
            let grad = group.generation(GRADUATED_GENERATION).expect("graduated");
            assert!(!grad.enabled, "{} graduated should default off", group.id);
        }
    }

    #[test]
    fn fullnames_are_unique_within_each_group() {
        for group in groups() {
            let mut names: Vec<_> = group.members().map(|m| m.fullname).collect();
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), total, "{}", group.id);
        }
    }
}
