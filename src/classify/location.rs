//! English → Chinese location labels.
//!
//! Exact dictionary hit, then per-segment translation ("Remote - Europe"),
//! then the longest dictionary key found inside the text. Anything left
//! unresolved passes through unchanged.

use crate::cache::BoundedCache;
use crate::job::LocalizedLocation;

const DICTIONARY: &[(&str, &str)] = &[
    // markers
    ("remote", "远程"),
    ("anywhere", "任何地方"),
    ("worldwide", "全球"),
    ("global", "全球"),
    ("work from anywhere", "任何地方"),
    // regions
    ("europe", "欧洲"),
    ("eu", "欧盟"),
    ("emea", "欧洲、中东及非洲"),
    ("apac", "亚太"),
    ("asia", "亚洲"),
    ("asia pacific", "亚太"),
    ("north america", "北美"),
    ("latin america", "拉丁美洲"),
    ("latam", "拉丁美洲"),
    ("americas", "美洲"),
    ("africa", "非洲"),
    ("middle east", "中东"),
    // countries
    ("us", "美国"),
    ("usa", "美国"),
    ("united states", "美国"),
    ("uk", "英国"),
    ("united kingdom", "英国"),
    ("canada", "加拿大"),
    ("australia", "澳大利亚"),
    ("germany", "德国"),
    ("france", "法国"),
    ("netherlands", "荷兰"),
    ("singapore", "新加坡"),
    ("japan", "日本"),
    ("china", "中国"),
    ("india", "印度"),
    ("brazil", "巴西"),
    ("mexico", "墨西哥"),
    ("spain", "西班牙"),
    ("italy", "意大利"),
    ("poland", "波兰"),
    ("sweden", "瑞典"),
    ("norway", "挪威"),
    ("denmark", "丹麦"),
    ("switzerland", "瑞士"),
    ("austria", "奥地利"),
    ("belgium", "比利时"),
    ("ireland", "爱尔兰"),
    ("portugal", "葡萄牙"),
    ("finland", "芬兰"),
    ("czech republic", "捷克"),
    ("czechia", "捷克"),
    ("hungary", "匈牙利"),
    ("romania", "罗马尼亚"),
    ("bulgaria", "保加利亚"),
    ("croatia", "克罗地亚"),
    ("estonia", "爱沙尼亚"),
    ("latvia", "拉脱维亚"),
    ("lithuania", "立陶宛"),
    ("slovenia", "斯洛文尼亚"),
    ("slovakia", "斯洛伐克"),
    ("greece", "希腊"),
    ("turkey", "土耳其"),
    ("israel", "以色列"),
    ("south africa", "南非"),
    ("new zealand", "新西兰"),
    ("south korea", "韩国"),
    ("korea", "韩国"),
    ("taiwan", "台湾"),
    ("hong kong", "香港"),
    ("malaysia", "马来西亚"),
    ("thailand", "泰国"),
    ("philippines", "菲律宾"),
    ("indonesia", "印度尼西亚"),
    ("vietnam", "越南"),
    ("argentina", "阿根廷"),
    ("chile", "智利"),
    ("colombia", "哥伦比亚"),
    ("peru", "秘鲁"),
    ("uruguay", "乌拉圭"),
    ("costa rica", "哥斯达黎加"),
    ("panama", "巴拿马"),
    ("ecuador", "厄瓜多尔"),
    ("bolivia", "玻利维亚"),
    ("paraguay", "巴拉圭"),
    ("venezuela", "委内瑞拉"),
    ("ukraine", "乌克兰"),
    ("nigeria", "尼日利亚"),
    ("kenya", "肯尼亚"),
    ("egypt", "埃及"),
    ("uae", "阿联酋"),
    ("united arab emirates", "阿联酋"),
    // cities
    ("new york", "纽约"),
    ("san francisco", "旧金山"),
    ("london", "伦敦"),
    ("berlin", "柏林"),
    ("paris", "巴黎"),
    ("amsterdam", "阿姆斯特丹"),
    ("toronto", "多伦多"),
    ("tokyo", "东京"),
    ("sydney", "悉尼"),
    ("beijing", "北京"),
    ("shanghai", "上海"),
    ("shenzhen", "深圳"),
    ("dubai", "迪拜"),
];

const SEGMENT_SEPARATORS: &[char] = &[',', '/', '|', '(', ')', '-', '–', '—', ';'];

fn exact(text: &str) -> Option<&'static str> {
    let t = text.trim();
    DICTIONARY
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(t))
        .map(|(_, v)| *v)
}

/// `needle` occurs in `hay` with no alphanumeric neighbour on either side.
fn contains_word(hay: &str, needle: &str) -> bool {
    hay.match_indices(needle).any(|(i, m)| {
        let before = hay[..i].chars().next_back();
        let after = hay[i + m.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

fn longest_contained(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    DICTIONARY
        .iter()
        .filter(|(k, _)| contains_word(&lower, k))
        .max_by_key(|(k, _)| k.len())
        .map(|(_, v)| *v)
}

/// Uncached translation. Unresolved input comes back unchanged.
pub fn translate_location(english: &str) -> String {
    let text = english.trim();
    if text.is_empty() {
        return String::new();
    }
    if let Some(hit) = exact(text) {
        return hit.to_string();
    }

    let segments: Vec<&str> = text
        .split(SEGMENT_SEPARATORS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if segments.len() > 1 {
        let translated: Vec<Option<&str>> = segments.iter().map(|s| exact(s)).collect();
        if translated.iter().any(Option::is_some) {
            let mut parts: Vec<String> = Vec::with_capacity(segments.len());
            for (seg, tr) in segments.iter().zip(translated) {
                let part = tr.map(str::to_string).unwrap_or_else(|| seg.to_string());
                if !parts.contains(&part) {
                    parts.push(part);
                }
            }
            return parts.join("、");
        }
    }

    longest_contained(text)
        .map(str::to_string)
        .unwrap_or_else(|| text.to_string())
}

/// Memoized translator, shared by the classifier.
pub struct LocationTranslator {
    cache: BoundedCache<String, String>,
}

impl LocationTranslator {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: BoundedCache::new(capacity),
        }
    }

    pub fn translate(&self, english: &str) -> LocalizedLocation {
        let key = english.trim().to_string();
        let chinese = match self.cache.get(&key) {
            Some(hit) => hit,
            None => {
                let out = translate_location(&key);
                self.cache.insert(key.clone(), out.clone());
                out
            }
        };
        LocalizedLocation {
            english: key,
            chinese,
        }
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl Default for LocationTranslator {
    fn default() -> Self {
        Self::new(1024)
    }
}
