//! Region bucket classification from free-text locations.
//!
//! Keyword lists are layered (global, mainland China, Greater China, APAC,
//! explicit overseas). ASCII keywords of three characters or fewer only
//! match on word boundaries so "us" never fires inside "business".

use once_cell::sync::Lazy;

use super::keywords::KeywordSet;
use crate::job::Region;

const GLOBAL: &[&str] = &[
    "anywhere", "everywhere", "worldwide", "global", "remote", "work from anywhere", "wfa",
    "distributed", "不限地点", "全球", "任意地点", "远程", "在家办公",
];

const MAINLAND: &[&str] = &[
    "china", "中国", "cn", "chinese", "mainland china", "prc", "beijing", "shanghai", "shenzhen",
    "guangzhou", "hangzhou", "chengdu", "北京", "上海", "深圳", "广州", "杭州", "成都", "重庆",
    "南京", "武汉", "西安", "苏州", "天津", "大连", "青岛", "厦门", "珠海", "佛山", "宁波", "无锡",
    "长沙", "郑州", "济南", "哈尔滨", "沈阳", "福州", "石家庄", "合肥", "昆明", "兰州",
];

const GREATER_CHINA: &[&str] = &[
    "hong kong", "hongkong", "hk", "香港", "macau", "macao", "澳门", "taiwan", "taipei", "台湾",
    "台北", "高雄",
];

const APAC: &[&str] = &[
    "apac", "asia pacific", "east asia", "southeast asia", "utc+8", "gmt+8", "cst",
    "asia/shanghai", "asia/hong_kong", "亚太", "东亚", "东南亚",
];

const OVERSEAS: &[&str] = &[
    // North America
    "us", "usa", "united states", "america", "san francisco", "new york", "seattle", "boston",
    "austin", "los angeles", "silicon valley", "bay area", "portland", "denver", "chicago",
    "atlanta", "miami", "dallas", "canada", "toronto", "vancouver", "montreal", "calgary",
    "mexico", "hawaii", "honolulu", "north america", "美国", "加拿大", "北美",
    // Europe
    "eu", "europe", "emea", "united kingdom", "england", "london", "uk", "britain", "germany",
    "berlin", "munich", "frankfurt", "hamburg", "deutschland", "france", "paris", "lyon",
    "spain", "madrid", "barcelona", "italy", "rome", "milan", "netherlands", "amsterdam",
    "rotterdam", "belgium", "brussels", "sweden", "stockholm", "norway", "oslo", "denmark",
    "copenhagen", "finland", "helsinki", "poland", "warsaw", "czech", "prague", "ireland",
    "dublin", "switzerland", "zurich", "geneva", "austria", "vienna", "portugal", "lisbon",
    "estonia", "latvia", "lithuania", "ukraine", "romania", "bulgaria", "greece", "athens",
    "英国", "德国", "法国", "西班牙", "意大利", "荷兰", "瑞典", "挪威", "芬兰", "波兰", "爱尔兰",
    "瑞士", "奥地利", "葡萄牙", "欧洲",
    // Oceania
    "australia", "sydney", "melbourne", "brisbane", "perth", "new zealand", "auckland",
    "wellington", "澳洲", "澳大利亚", "新西兰",
    // Asia outside Greater China
    "japan", "tokyo", "osaka", "kyoto", "korea", "seoul", "busan", "singapore", "malaysia",
    "kuala lumpur", "indonesia", "jakarta", "bali", "thailand", "bangkok", "vietnam", "hanoi",
    "ho chi minh", "philippines", "manila", "india", "bangalore", "mumbai", "delhi", "hyderabad",
    "pune", "pakistan", "karachi", "bangladesh", "dhaka", "sri lanka", "colombo", "kuwait",
    "日本", "东京", "韩国", "首尔", "新加坡", "马来西亚", "印尼", "泰国", "越南", "菲律宾", "印度",
    // Middle East
    "uae", "dubai", "abu dhabi", "saudi", "riyadh", "jeddah", "qatar", "doha", "israel",
    "tel aviv", "jerusalem", "turkey", "istanbul", "ankara", "阿联酋", "迪拜", "沙特", "卡塔尔",
    "以色列", "土耳其",
    // South America
    "brazil", "sao paulo", "rio de janeiro", "argentina", "buenos aires", "chile", "santiago",
    "colombia", "bogota", "peru", "lima", "uruguay", "montevideo", "latam", "latin america",
    "巴西", "阿根廷", "智利", "哥伦比亚", "秘鲁", "乌拉圭", "南美",
    // Others
    "russia", "moscow", "st petersburg", "africa", "egypt", "cairo", "south africa",
    "cape town", "nigeria", "kenya", "俄罗斯", "非洲", "埃及", "南非",
];

static GLOBAL_SET: Lazy<KeywordSet> = Lazy::new(|| KeywordSet::short_bounded(GLOBAL));
static MAINLAND_SET: Lazy<KeywordSet> = Lazy::new(|| KeywordSet::short_bounded(MAINLAND));
static GREATER_CHINA_SET: Lazy<KeywordSet> =
    Lazy::new(|| KeywordSet::short_bounded(GREATER_CHINA));
static APAC_SET: Lazy<KeywordSet> = Lazy::new(|| KeywordSet::short_bounded(APAC));
static OVERSEAS_SET: Lazy<KeywordSet> = Lazy::new(|| KeywordSet::short_bounded(OVERSEAS));

/// Which keyword layers a location string hits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionSignals {
    pub global: bool,
    pub mainland: bool,
    pub greater_china: bool,
    pub apac: bool,
    pub overseas: bool,
}

impl RegionSignals {
    pub fn detect(location: &str) -> Self {
        let loc = location.trim().to_lowercase();
        Self {
            global: GLOBAL_SET.hits(&loc),
            mainland: MAINLAND_SET.hits(&loc),
            greater_china: GREATER_CHINA_SET.hits(&loc),
            apac: APAC_SET.hits(&loc),
            overseas: OVERSEAS_SET.hits(&loc),
        }
    }

    pub fn any(&self) -> bool {
        self.global || self.mainland || self.greater_china || self.apac || self.overseas
    }

    /// Precedence: China (+ any other signal) > China alone > APAC > overseas > global > overseas.
    pub fn resolve(&self) -> Region {
        if self.mainland || self.greater_china {
            if self.overseas || self.global || self.apac {
                return Region::Both;
            }
            return Region::Domestic;
        }
        if self.apac {
            return Region::Both;
        }
        if self.overseas {
            return Region::Overseas;
        }
        if self.global {
            return Region::Both;
        }
        Region::Overseas
    }
}

/// Classify a location string. Blank locations are open to both audiences.
pub fn classify_region(location: &str) -> Region {
    if location.trim().is_empty() {
        return Region::Both;
    }
    RegionSignals::detect(location).resolve()
}

/// True when the text names any known place or remote marker.
pub fn is_known_location(text: &str) -> bool {
    let t = text.trim();
    t.chars().count() >= 2 && RegionSignals::detect(t).any()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_examples() {
        assert_eq!(classify_region("Beijing, China"), Region::Domestic);
        assert_eq!(classify_region("Remote - Anywhere"), Region::Both);
        assert_eq!(classify_region("London, UK"), Region::Overseas);
        assert_eq!(classify_region("Singapore, APAC, UTC+8"), Region::Both);
        assert_eq!(classify_region("Shanghai or Remote (US)"), Region::Both);
    }

    #[test]
    fn short_codes_need_word_boundaries() {
        // "us" inside "business", "eu" inside "museum"
        assert_eq!(
            RegionSignals::detect("business museum"),
            RegionSignals::default()
        );
        assert!(RegionSignals::detect("Remote (US only)").overseas);
        assert!(RegionSignals::detect("HK office").greater_china);
    }

    #[test]
    fn precedence_and_defaults() {
        assert_eq!(classify_region(""), Region::Both);
        assert_eq!(classify_region("Mars Colony"), Region::Overseas);
        assert_eq!(classify_region("Hong Kong"), Region::Domestic);
        assert_eq!(classify_region("Tokyo, Japan"), Region::Overseas);
        assert_eq!(classify_region("APAC timezones"), Region::Both);
        assert_eq!(classify_region("Worldwide"), Region::Both);
        assert_eq!(classify_region("深圳 / 新加坡"), Region::Both);
    }

    #[test]
    fn known_location_check() {
        assert!(is_known_location("Germany"));
        assert!(is_known_location("UK"));
        assert!(!is_known_location("Senior Engineer"));
        assert!(!is_known_location("x"));
    }
}
