//! Default collections used on first start and whenever a durable record is
//! missing or fails to decode.
//!
//! Counts are drawn from a seeded ChaCha RNG so two contexts seeding from the
//! same value start from identical trees. The fully modeled region starts at
//! zero so every case it shows comes from a filed report.

use chrono::NaiveDate;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::aggregation::{recompute_region_from_districts, recompute_standalone_region};
use crate::config::{FULLY_MODELED_REGION_ID, SEED_DATE};
use crate::disease::{total_affected, Disease, Trend};
use crate::hierarchy::{District, Region, SubDivision};

type SubDivisionSpec = (&'static str, &'static [&'static str]);

/// District → subdivisions → blocks for the fully modeled region.
pub const ARUNACHAL_STRUCTURE: &[(&str, &[SubDivisionSpec])] = &[
    ("Tawang", &[
        ("Tawang", &["Kitpi", "Tawang", "Thingbu", "Mukto", "Zemithang"]),
        ("Lumla", &["Lumla"]),
        ("Jang", &["Jang"]),
    ]),
    ("West Kameng", &[
        ("Bomdila", &["Dirang", "Kalaktang", "Nafra-Buragaon", "Thrizino", "Singchung"]),
        ("Dirang", &["Dirang", "Kalaktang"]),
        ("Thrizino", &["Thrizino", "Singchung"]),
    ]),
    ("East Kameng", &[
        ("Seppa (Sadar)", &["Bameng", "Seppa", "Bana", "Khenewa", "Sawa"]),
        ("Bameng", &["Bameng", "Pipu", "Lada"]),
        ("Chayangtajo", &["Chayangtajo", "Gyawe Purang", "Richukrong"]),
    ]),
    ("Papum Pare", &[
        ("Balijan", &["Balijan"]),
        ("Doimukh", &["Doimukh"]),
        ("Kimin", &["Kimin"]),
        ("Sagalee", &["Sagalee"]),
        ("Capital Area", &["Borum", "Mengio"]),
    ]),
    ("Kurung Kumey", &[
        ("Koloriang", &["Koloriang", "Parsiparlo", "Sangram"]),
        ("Nyapin", &["Nyapin", "Phassang"]),
        ("Damin", &["Damin", "Sarli"]),
    ]),
    ("Kra Daadi", &[
        ("Palin", &["Palin"]),
        ("Tali", &["Tali"]),
        ("Chambang", &["Chambang"]),
        ("Pipsorang", &["Pipsorang"]),
        ("Yangte", &["Yangte"]),
        ("Gangte", &["Gangte"]),
        ("Tarak Langdi", &["Tarak Langdi"]),
    ]),
    ("Lower Subansiri", &[
        ("Ziro-I", &["Ziro-I"]),
        ("Ziro-II", &["Ziro-II"]),
    ]),
    ("Upper Subansiri", &[
        ("Daporijo", &["Daporijo", "Baririjo", "Giba", "Dumporijo"]),
        ("Nacho", &["Nacho"]),
        ("Limeking", &["Limeking"]),
        ("Other Circles", &["Siyum", "Chetam", "Taliha", "Payeng", "Taksing"]),
    ]),
    ("West Siang", &[
        ("Aalo", &["Aalo East", "Aalo West", "Liromoba", "Bagra", "Darak", "Kamba", "Yomcha", "Gensi", "Jomlo Mobuk"]),
    ]),
    ("East Siang", &[
        ("Pasighat", &["Pasighat"]),
        ("Ruksin", &["Ruksin"]),
        ("Mebo", &["Mebo"]),
    ]),
    ("Siang", &[
        ("Boleng", &["Boleng"]),
        ("Pangin", &["Pangin"]),
        ("Rumgong", &["Rumgong"]),
        ("Kaying", &["Kaying"]),
    ]),
    ("Upper Siang", &[
        ("Yingkiong", &["Yingkiong", "Jengging"]),
        ("Mariyang", &["Mariyang", "Geku", "Katan", "Mopom"]),
        ("Tuting", &["Tuting", "Gelling", "Singa", "Palling", "Migging"]),
    ]),
    ("Lower Siang", &[
        ("Gensi", &["Gensi"]),
        ("Kangku", &["Kangku"]),
        ("Likabali", &["Likabali"]),
        ("Ramle Bango", &["Ramle Bango"]),
    ]),
    ("Lower Dibang Valley", &[
        ("Roing", &["Roing", "Koronu"]),
        ("Parbuk", &["Parbuk"]),
        ("Hunli", &["Hunli", "Desali"]),
        ("Dambuk", &["Dambuk", "Paglam"]),
    ]),
    ("Dibang Valley", &[
        ("Anini", &["Mipi-Anini-Alinye", "Etalin-Malinye", "Anelih-Arzoo"]),
    ]),
    ("Anjaw", &[
        ("Hawai", &["Hawai-Walong"]),
        ("Hayuliang", &["Hayuliang-Goiliang"]),
        ("Chaglagam", &["Chaglagam"]),
        ("Manchal", &["Manchal"]),
    ]),
    ("Lohit", &[
        ("Sunpura", &["Sunpura"]),
        ("Tezu", &["Tezu"]),
        ("Wakro", &["Wakro"]),
        ("Lathao", &["Lathao"]),
        ("Chongkham", &["Chongkham"]),
        ("Lekang", &["Lekang"]),
        ("Piyong", &["Piyong"]),
    ]),
    ("Namsai", &[
        ("Namsai", &["Namsai"]),
        ("Lekang", &["Lekang"]),
        ("Chongkham", &["Chongkham"]),
    ]),
    ("Changlang", &[
        ("Changlang", &["Changlang", "Yatdam", "Khimiyang"]),
        ("Miao", &["Khagam-Miao", "Vijoynagar"]),
        ("Jairampur", &["Nampong", "Manmao"]),
        ("Bordumsa", &["Bordumsa", "Diyun"]),
    ]),
    ("Tirap", &[
        ("Khonsa", &["Khonsa"]),
        ("Deomali", &["Namsang", "Lazu", "Dadam", "Borduria", "Khonsa Block"]),
    ]),
    ("Longding", &[
        ("Longding", &["Longding", "Kanubari", "Lawnu", "Wakka", "Pongchau", "Niausa"]),
    ]),
    ("Kamle", &[
        ("Raga", &["Puchi Geko"]),
        ("Dollungmukh", &["Puchi Geko"]),
        ("Kamporijo", &["Tamen-Raga"]),
    ]),
    ("Pakke-Kessang", &[
        ("Pakke-Kessang", &["Pakke-Kessang Block"]),
        ("Seijosa", &["Seijosa Block"]),
    ]),
    ("Shi Yomi", &[
        ("Menchukha", &["Menchukha", "Tato"]),
        ("Monigong", &["Monigong", "Pidi"]),
    ]),
    ("Lepa Rada", &[
        ("Basar", &["Basar"]),
        ("Daring", &["Daring"]),
        ("Sago", &["Sago"]),
        ("Tirbin", &["Tirbin"]),
    ]),
    ("Keyi Panyor", &[
        ("Yachuli", &["Deed", "Pistana", "Yachuli", "Yazali"]),
    ]),
    ("Bichom", &[
        ("Nafra", &["Nafra", "Khizing", "Prithivnagar"]),
        ("Lada", &["Lada", "Pichang"]),
    ]),
];

/// Districts (no finer structure) of the other north-eastern regions.
pub const NORTH_EAST_DISTRICTS: &[(&str, &[&str])] = &[
    ("AS", &[
        "Tinsukia", "Dibrugarh", "Charaideo", "Sivasagar", "Jorhat", "Majuli", "Golaghat",
        "Karbi Anglong", "West Karbi Anglong", "Dima Hasao", "Cachar", "Hailakandi", "Karimganj",
        "Dhubri", "South Salmara-Mankachar", "Goalpara", "Barpeta", "Nalbari", "Baksa", "Chirang",
        "Bongaigaon", "Kokrajhar", "Kamrup Metro", "Kamrup", "Rangia", "Morigaon", "Nagaon",
        "Hojai", "Sonitpur", "Biswanath", "Udalguri", "Darrang", "Tamulpur", "Lakhimpur", "Dhemaji",
    ]),
    ("MN", &[
        "Imphal East", "Imphal West", "Thoubal", "Kakching", "Bishnupur", "Churachandpur",
        "Pherzawl", "Senapati", "Kangpokpi", "Ukhrul", "Kamjong", "Chandel", "Tengnoupal",
        "Tamenglong", "Noney", "Jiribam",
    ]),
    ("ML", &[
        "East Khasi Hills", "West Khasi Hills", "South West Khasi Hills", "Ri-Bhoi",
        "West Jaintia Hills", "East Jaintia Hills", "East Garo Hills", "West Garo Hills",
        "South West Garo Hills", "North Garo Hills", "South Garo Hills", "Eastern West Khasi Hills",
    ]),
    ("MZ", &[
        "Aizawl", "Lunglei", "Saiha (Siaha)", "Champhai", "Kolasib", "Serchhip", "Lawngtlai",
        "Mamit", "Hnahthial", "Khawzawl", "Saitual",
    ]),
    ("NL", &[
        "Dimapur", "Kohima", "Mokokchung", "Wokha", "Zunheboto", "Tuensang", "Mon", "Phek",
        "Kiphire", "Longleng", "Peren", "Noklak", "Tseminyu", "Chümoukedima", "Niuland", "Shamator",
    ]),
    ("SK", &["Gangtok", "Pakyong", "Gyalshing", "Soreng", "Namchi", "Mangan"]),
    ("TR", &[
        "West Tripura", "Sepahijala", "Khowai", "Gomati", "South Tripura", "Dhalai", "Unakoti",
        "North Tripura",
    ]),
];

/// (id, name) of every region, matching the map's region ids.
pub const REGIONS: &[(&str, &str)] = &[
    ("AP", "Andhra Pradesh"),
    ("AR", "Arunachal Pradesh"),
    ("AS", "Assam"),
    ("BR", "Bihar"),
    ("CT", "Chhattisgarh"),
    ("GA", "Goa"),
    ("GJ", "Gujarat"),
    ("HR", "Haryana"),
    ("HP", "Himachal Pradesh"),
    ("JH", "Jharkhand"),
    ("KL", "Kerala"),
    ("MP", "Madhya Pradesh"),
    ("MN", "Manipur"),
    ("ML", "Meghalaya"),
    ("MZ", "Mizoram"),
    ("NL", "Nagaland"),
    ("PB", "Punjab"),
    ("RJ", "Rajasthan"),
    ("SK", "Sikkim"),
    ("TG", "Telangana"),
    ("TR", "Tripura"),
    ("UP", "Uttar Pradesh"),
    ("UT", "Uttarakhand"),
    ("WB", "West Bengal"),
    ("JK", "Jammu & Kashmir"),
    ("LA", "Ladakh"),
    ("OD", "Odisha"),
    ("KA", "Karnataka"),
    ("TN", "Tamil Nadu"),
    ("MH", "Maharashtra"),
    ("DL", "Delhi"),
];

/// Hand-entered figures for regions that have no district breakdown:
/// (region id, [(disease, affected, trend, last updated day of Oct 2023)]).
const FIXED_REGION_FIGURES: &[(&str, [(&str, u32, Trend, u32); 4])] = &[
    ("MH", [
        ("Diarrhea", 450, Trend::Up, 25),
        ("Typhoid", 300, Trend::Stable, 24),
        ("Cholera", 150, Trend::Down, 20),
        ("Hepatitis A", 350, Trend::Up, 26),
    ]),
    ("DL", [
        ("Diarrhea", 300, Trend::Down, 25),
        ("Typhoid", 400, Trend::Up, 25),
        ("Cholera", 210, Trend::Stable, 25),
        ("Hepatitis A", 290, Trend::Up, 25),
    ]),
];

/// Disease names and (upper bound for random counts, default trend).
const BASE_DISEASES: [(&str, u32, Trend); 4] = [
    ("Diarrhea", 50, Trend::Stable),
    ("Typhoid", 30, Trend::Up),
    ("Cholera", 20, Trend::Down),
    ("Hepatitis A", 25, Trend::Stable),
];

fn seed_date() -> NaiveDate {
    let (y, m, d) = SEED_DATE;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn base_diseases(rng: &mut ChaCha8Rng, zeroed: bool) -> Vec<Disease> {
    BASE_DISEASES
        .iter()
        .enumerate()
        .map(|(i, &(name, bound, trend))| {
            let affected = if zeroed { 0 } else { rng.gen_range(0..bound) };
            let trend = if zeroed { Trend::Stable } else { trend };
            Disease::new((i + 1).to_string(), name, affected, seed_date()).with_trend(trend)
        })
        .collect()
}

fn arunachal_districts(rng: &mut ChaCha8Rng) -> Vec<District> {
    ARUNACHAL_STRUCTURE
        .iter()
        .enumerate()
        .map(|(index, &(name, subs))| District {
            id: format!("ar-dist-{index}"),
            name: name.to_string(),
            diseases: base_diseases(rng, true),
            total_affected: 0,
            sub_divisions: Some(
                subs.iter()
                    .map(|&(sd, blocks)| SubDivision::new(sd, blocks))
                    .collect(),
            ),
        })
        .collect()
}

fn plain_districts(rng: &mut ChaCha8Rng, names: &[&str]) -> Vec<District> {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let diseases = base_diseases(rng, false);
            let prefix: String = name.chars().take(3).collect();
            District {
                id: format!("dist-{index}-{prefix}"),
                name: name.to_string(),
                total_affected: total_affected(&diseases),
                diseases,
                sub_divisions: None,
            }
        })
        .collect()
}

fn standalone_diseases(rng: &mut ChaCha8Rng, region_id: &str) -> Vec<Disease> {
    if let Some((_, figures)) = FIXED_REGION_FIGURES.iter().find(|(id, _)| *id == region_id) {
        return figures
            .iter()
            .enumerate()
            .map(|(i, &(name, affected, trend, day))| {
                let date = NaiveDate::from_ymd_opt(2023, 10, day).unwrap_or_else(seed_date);
                Disease::new((i + 1).to_string(), name, affected, date).with_trend(trend)
            })
            .collect();
    }
    let bounds = [300, 200, 100, 150];
    BASE_DISEASES
        .iter()
        .zip(bounds)
        .enumerate()
        .map(|(i, (&(name, _, trend), bound))| {
            Disease::new((i + 1).to_string(), name, rng.gen_range(0..bound), seed_date())
                .with_trend(trend)
        })
        .collect()
}

/// The full region tree, sorted by region name, with every invariant holding.
pub fn seed_regions(seed: u64) -> Vec<Region> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut regions: Vec<Region> = REGIONS
        .iter()
        .map(|&(id, name)| {
            let districts = if id == FULLY_MODELED_REGION_ID {
                Some(arunachal_districts(&mut rng))
            } else {
                NORTH_EAST_DISTRICTS
                    .iter()
                    .find(|(rid, _)| *rid == id)
                    .map(|(_, names)| plain_districts(&mut rng, names))
            };
            let shell = Region {
                id: id.to_string(),
                name: name.to_string(),
                diseases: Vec::new(),
                total_affected: 0,
                admin_email: None,
                districts: None,
            };
            match districts {
                Some(districts) => recompute_region_from_districts(&shell, &districts),
                None => recompute_standalone_region(&Region {
                    diseases: standalone_diseases(&mut rng, id),
                    ..shell
                }),
            }
        })
        .collect();
    regions.sort_by(|a, b| a.name.cmp(&b.name));
    regions
}
