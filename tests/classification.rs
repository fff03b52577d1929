//! 基于内置规则库 data/useragent.yml 的端到端识别测试
//! 用例表见 tests/fixtures/useragent_test.yml

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use rsuseragent::{ClassificationModel, ConfigManager, RuleLoader, UaError, Version};

#[derive(Debug, Deserialize)]
struct Fixtures {
    browser: BrowserFixtures,
    operating_system: OperatingSystemFixtures,
}

#[derive(Debug, Deserialize)]
struct BrowserFixtures {
    parse: HashMap<String, Vec<String>>,
    version: Vec<VersionCase>,
}

#[derive(Debug, Deserialize)]
struct VersionCase {
    user_agent: String,
    version: Option<ExpectedVersion>,
}

#[derive(Debug, Deserialize)]
struct ExpectedVersion {
    full: String,
    major: String,
    minor: String,
}

#[derive(Debug, Deserialize)]
struct OperatingSystemFixtures {
    parse: HashMap<String, Vec<String>>,
    device_type: HashMap<String, Vec<String>>,
}

fn manifest_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

static MODEL: Lazy<ClassificationModel> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    RuleLoader::load_file(manifest_path("data/useragent.yml")).expect("内置规则库加载失败")
});

static FIXTURES: Lazy<Fixtures> = Lazy::new(|| {
    let content = std::fs::read_to_string(manifest_path("tests/fixtures/useragent_test.yml"))
        .expect("用例文件读取失败");
    serde_yaml::from_str(&content).expect("用例文件解析失败")
});

// ======== 用例表驱动 ========

#[test]
fn test_browser_parse_fixtures() {
    for (key, user_agents) in &FIXTURES.browser.parse {
        assert!(MODEL.browser(key).is_some(), "规则库中不存在浏览器 {}", key);
        for ua in user_agents {
            let browser = MODEL.classify_browser(ua);
            assert_eq!(browser.key(), key, "UA: {}", ua);
        }
    }
}

#[test]
fn test_browser_version_fixtures() {
    for case in &FIXTURES.browser.version {
        let actual = MODEL.classify_browser(&case.user_agent).version(&case.user_agent);
        let expected = case.version.as_ref().map(|v| Version {
            full: v.full.clone(),
            major: v.major.clone(),
            minor: v.minor.clone(),
        });
        assert_eq!(actual, expected, "UA: {}", case.user_agent);
    }
}

#[test]
fn test_operating_system_parse_fixtures() {
    for (key, user_agents) in &FIXTURES.operating_system.parse {
        assert!(MODEL.operating_system(key).is_some(), "规则库中不存在操作系统 {}", key);
        for ua in user_agents {
            let os = MODEL.classify_operating_system(ua);
            assert_eq!(os.key(), key, "UA: {}", ua);
        }
    }
}

#[test]
fn test_device_type_fixtures() {
    for (device_type, user_agents) in &FIXTURES.operating_system.device_type {
        for ua in user_agents {
            let os = MODEL.classify_operating_system(ua);
            let actual = os.device_type().map(|d| d.key.as_str());
            assert_eq!(actual, Some(device_type.as_str()), "UA: {}", ua);
        }
    }
}

// ======== 内置规则库上的继承与派生属性 ========

#[test]
fn test_inherited_attributes() {
    let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Mobile/15E148 Safari/604.1";
    let browser = MODEL.classify_browser(ua);
    assert_eq!(browser.key(), "mobile_safari");
    // 自身设置
    assert_eq!(browser.browser_type().map(|t| t.key.as_str()), Some("mobile_browser"));
    // 继承自 safari
    assert_eq!(browser.manufacturer().key, "apple");
    assert_eq!(browser.rendering_engine().map(|e| e.name.as_str()), Some("WebKit"));
    assert!(browser.version_regex().is_some());
    assert_eq!(browser.group(), "Safari");
    assert_eq!(browser.parent().map(|p| p.key()), Some("safari"));
}

#[test]
fn test_child_overrides_parent_manufacturer() {
    let googlebot = MODEL.browser("googlebot").unwrap();
    assert_eq!(googlebot.manufacturer().key, "google");
    assert_eq!(googlebot.browser_type().map(|t| t.key.as_str()), Some("robot"));
    assert_eq!(googlebot.group(), "Robot/Spider");

    let ubuntu = MODEL.operating_system("ubuntu").unwrap();
    assert_eq!(ubuntu.manufacturer().key, "canonical");
    assert_eq!(ubuntu.device_type().map(|d| d.key.as_str()), Some("computer"));
    assert_eq!(ubuntu.group(), "Linux");
}

#[test]
fn test_derived_ids() {
    // google = 3，chrome_mobile 本地 id = 4
    assert_eq!(MODEL.browser("chrome_mobile").unwrap().id(), (3 << 8) | 4);
    // googlebot 的厂商覆盖为 google，本地 id = 2
    assert_eq!(MODEL.browser("googlebot").unwrap().id(), (3 << 8) | 2);
    // ubuntu 的厂商为 canonical = 10
    assert_eq!(MODEL.operating_system("ubuntu").unwrap().id(), (10 << 8) | 1);
    assert_eq!(MODEL.unknown_browser().id(), 0);
    assert_eq!(MODEL.unknown_operating_system().id(), 0);
}

#[test]
fn test_unknown_sentinels() {
    let result = MODEL.classify("");
    assert!(result.browser.is_unknown());
    assert!(result.operating_system.is_unknown());
    assert_eq!(result.browser.manufacturer().id, 0);
    assert_eq!(result.browser.browser_type().map(|t| t.key.as_str()), Some("unknown"));
    assert_eq!(result.browser.version(""), None);
    assert_eq!(result.operating_system.device_type().map(|d| d.key.as_str()), Some("unknown"));
}

#[test]
fn test_exclusion_does_not_block_children() {
    // bot 分支因 Cubot 被否决后继续尝试后续根节点
    let ua = "Mozilla/5.0 (Linux; Android 9; CUBOT_X19) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/88.0.4324.181 Mobile Safari/537.36";
    assert_eq!(MODEL.classify_browser(ua).key(), "chrome_mobile");
    // 命中 bot 的子节点时不再检查 bot 的排除列表
    let ua = "Cubot crawler Googlebot/2.1";
    assert_eq!(MODEL.classify_browser(ua).key(), "googlebot");
}

#[test]
fn test_classification_is_deterministic() {
    for user_agents in FIXTURES.browser.parse.values() {
        for ua in user_agents {
            let first = MODEL.classify(ua);
            let second = MODEL.classify(ua);
            assert_eq!(first, second, "UA: {}", ua);
        }
    }
}

#[test]
fn test_report_output() {
    let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
    let report = MODEL.classify(ua).report(ua);
    assert_eq!(report.to_string(), "Chrome 91.0 (Windows 10)");

    let line = report.to_json().unwrap();
    assert!(!line.contains('\n'));
    let json: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(json["user_agent"], ua);
    assert_eq!(json["browser"]["key"], "chrome");
    assert_eq!(json["browser"]["manufacturer"], "Google Inc.");
    assert_eq!(json["browser"]["version"]["major"], "91");
    assert_eq!(json["operating_system"]["group"], "Windows");
    assert_eq!(json["operating_system"]["device_type"], "Computer");

    // 无版本时省略 version 字段
    let report = MODEL.classify("python-requests/2.25.1").report("python-requests/2.25.1");
    assert_eq!(report.to_string(), "Downloading Tool (Unknown)");
    let json = serde_json::to_value(&report).unwrap();
    assert!(json["browser"].get("version").is_none());
}

#[test]
fn test_concurrent_classification() {
    let model = Arc::new(RuleLoader::load_file(manifest_path("data/useragent.yml")).unwrap());
    let cases: Vec<(String, String)> = FIXTURES
        .browser
        .parse
        .iter()
        .flat_map(|(key, uas)| uas.iter().map(move |ua| (key.clone(), ua.clone())))
        .collect();
    let cases = Arc::new(cases);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let model = Arc::clone(&model);
            let cases = Arc::clone(&cases);
            thread::spawn(move || {
                for _ in 0..50 {
                    for (key, ua) in cases.iter() {
                        assert_eq!(model.classify_browser(ua).key(), key);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[tokio::test]
async fn test_async_load_from_config() {
    let config = ConfigManager::custom()
        .rule_file(manifest_path("data/useragent.yml"))
        .build();
    let model = RuleLoader::load(&config).await.unwrap();
    assert_eq!(model.browser_forest().len(), MODEL.browser_forest().len());
    assert_eq!(model.tables().manufacturers.len(), 11);
    assert!(model.tables().manufacturer(":google").is_some());
}

#[tokio::test]
async fn test_async_load_missing_file() {
    let config = ConfigManager::custom()
        .rule_file(manifest_path("tests/fixtures/does_not_exist.yml"))
        .build();
    let err = RuleLoader::load(&config).await.unwrap_err();
    assert!(matches!(err, UaError::Io(_)));
}

// ======== 小型内联规则 ========

const MINIMAL_TABLES: &str = r#"
manufacturers:
  unknown:
    id: 0
    name: Unknown
operating_systems:
  unknown:
    id: 0
    name: Unknown
"#;

fn inline_model(browsers: &str) -> ClassificationModel {
    RuleLoader::from_yaml_str(&format!("{}browsers:\n{}", MINIMAL_TABLES, browsers)).unwrap()
}

#[test]
fn test_child_alias_wins_over_parent() {
    let model = inline_model(
        r#"
  safari:
    id: 1
    name: Safari
    aliases: [Safari]
    children:
      mobile_safari:
        id: 2
        name: Mobile Safari
        aliases: [Mobile Safari]
  unknown:
    id: 0
    name: Unknown
"#,
    );
    assert_eq!(model.classify_browser("Mozilla/5.0 Mobile Safari/600.1").key(), "mobile_safari");
    assert_eq!(model.classify_browser("Mozilla/5.0 Safari/600.1").key(), "safari");
}

#[test]
fn test_excluded_root_falls_through_to_unknown() {
    let model = inline_model(
        r#"
  chrome:
    id: 1
    name: Chrome
    aliases: [Chrome]
    exclude_list: [Edge]
  unknown:
    id: 0
    name: Unknown
"#,
    );
    assert!(model.classify_browser("Mozilla/5.0 Chrome/90.0 Edge/18").is_unknown());
    assert_eq!(model.classify_browser("Mozilla/5.0 Chrome/90.0").key(), "chrome");
}

#[test]
fn test_sequential_group_version() {
    let model = inline_model(
        r#"
  chrome:
    id: 1
    name: Chrome
    aliases: [Chrome]
    version_regex: 'Chrome/(\d+)\.(\d+)'
  unknown:
    id: 0
    name: Unknown
"#,
    );
    let ua = "Chrome/90.0.4430";
    let browser = model.classify_browser(ua);
    let version = browser.version(ua).unwrap();
    assert_eq!(
        (version.full.as_str(), version.major.as_str(), version.minor.as_str()),
        ("90.0", "90", "0")
    );
    assert_eq!(browser.version_captures(ua).unwrap(), vec!["Chrome/90.0", "90", "0", "0"]);

    // 第二个分组非零时 minor 仍为补齐值
    let ua = "Mozilla/5.0 Chrome/90.5.4430";
    let browser = model.classify_browser(ua);
    let version = browser.version(ua).unwrap();
    assert_eq!(
        (version.full.as_str(), version.major.as_str(), version.minor.as_str()),
        ("90.5", "90", "0")
    );
    assert_eq!(browser.version_captures(ua).unwrap(), vec!["Chrome/90.5", "90", "5", "0"]);
}
