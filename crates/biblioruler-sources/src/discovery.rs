//! Locating source databases from the applications' own preferences
//!
//! Papers3 and Mendeley Desktop keep their library location in macOS
//! preference plists. Zotero records its profiles in `profiles.ini` and the
//! data directory in the profile's `prefs.js`.

use lazy_static::lazy_static;
use plist::Value;
use regex::Regex;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref INI_SECTION: Regex = Regex::new(r"^\s*\[([^\]]+)\]\s*$").unwrap();
    static ref INI_ENTRY: Regex = Regex::new(r"^\s*([^=;#\s][^=]*?)\s*=\s*(.*?)\s*$").unwrap();
    static ref USER_PREF: Regex = Regex::new(r#"user_pref\("([^"]+)",\s*"([^"]+)"\)"#).unwrap();
}

const PAPERS3_PLIST: &str = "Library/Preferences/com.mekentosj.papers3.plist";
const MENDELEY_PLIST: &str = "Library/Preferences/com.mendeley.Mendeley Desktop.plist";

/// A discovered database and the base directory of its files
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discovered {
    pub dbpath: PathBuf,
    pub filebase: Option<PathBuf>,
}

fn read_plist(path: &Path) -> Option<Value> {
    match plist::Value::from_file(path) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Preference file not readable");
            None
        }
    }
}

fn plist_string<'a>(plist: &'a Value, key: &str) -> Option<&'a str> {
    plist.as_dictionary()?.get(key)?.as_string()
}

/// Papers3 library from `com.mekentosj.papers3.plist`
pub fn papers3(home: &Path) -> Option<Discovered> {
    let found = papers3_from_plist(home, &read_plist(&home.join(PAPERS3_PLIST))?)?;
    tracing::info!(path = %found.dbpath.display(), "Papers3 database");
    Some(found)
}

pub fn papers3_from_plist(home: &Path, plist: &Value) -> Option<Discovered> {
    let library = plist_string(plist, "mt_papers3_library_location_local")?;
    let dbpath = home
        .join("Library/Application Support")
        .join(library)
        .join("Library.papers3")
        .join("Database.papersdb");
    let filebase = plist_string(plist, "mt_papers3_full_library_location_shared").map(PathBuf::from);
    Some(Discovered { dbpath, filebase })
}

/// Mendeley Desktop database from its preference plist
pub fn mendeley(home: &Path) -> Option<Discovered> {
    let found = mendeley_from_plist(home, &read_plist(&home.join(MENDELEY_PLIST))?)?;
    tracing::info!(path = %found.dbpath.display(), "Mendeley database");
    Some(found)
}

pub fn mendeley_from_plist(home: &Path, plist: &Value) -> Option<Discovered> {
    let email = plist_string(plist, "MendeleyWeb.userEmail")?;
    let dbpath = home
        .join("Library/Application Support/Mendeley Desktop")
        .join(format!("{email}@www.mendeley.com.sqlite"));
    Some(Discovered {
        dbpath,
        filebase: None,
    })
}

/// Zotero application directory for this platform
pub fn zotero_home(home: &Path) -> PathBuf {
    if cfg!(target_os = "macos") {
        home.join("Library/Application Support/Zotero")
    } else {
        home.join(".zotero/zotero")
    }
}

/// Zotero database and attachment base from the default profile
pub fn zotero(home: &Path) -> Option<Discovered> {
    let main = zotero_home(home);
    let ini = std::fs::read_to_string(main.join("profiles.ini")).ok()?;
    let profile = main.join(default_profile(&ini)?);
    let prefs = std::fs::read(profile.join("prefs.js")).ok()?;
    let prefs = ZoteroPrefs::parse(&String::from_utf8_lossy(&prefs));

    let data_dir = prefs.data_dir.unwrap_or_else(|| home.join("Zotero"));
    let found = Discovered {
        dbpath: data_dir.join("zotero.sqlite"),
        filebase: prefs
            .base_attachment_path
            .or_else(|| Some(data_dir.join("storage"))),
    };
    tracing::info!(path = %found.dbpath.display(), "Zotero database");
    Some(found)
}

/// Relative path of the profile marked `Default=1` in `profiles.ini`
pub fn default_profile(ini: &str) -> Option<String> {
    let mut in_profile = false;
    let mut path: Option<String> = None;
    let mut is_default = false;

    for line in ini.lines() {
        if let Some(caps) = INI_SECTION.captures(line) {
            if in_profile && is_default {
                return path;
            }
            in_profile = caps[1].starts_with("Profile");
            path = None;
            is_default = false;
        } else if let Some(caps) = INI_ENTRY.captures(line) {
            if !in_profile {
                continue;
            }
            match &caps[1] {
                "Path" => path = Some(caps[2].to_string()),
                "Default" => is_default = &caps[2] == "1",
                _ => {}
            }
        }
    }
    if in_profile && is_default {
        path
    } else {
        None
    }
}

/// The Zotero preferences biblioruler cares about
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZoteroPrefs {
    pub data_dir: Option<PathBuf>,
    pub base_attachment_path: Option<PathBuf>,
}

impl ZoteroPrefs {
    pub fn parse(prefs_js: &str) -> Self {
        let mut prefs = Self::default();
        for caps in prefs_js.lines().filter_map(|line| USER_PREF.captures(line)) {
            match &caps[1] {
                "extensions.zotero.dataDir" => prefs.data_dir = Some(PathBuf::from(&caps[2])),
                "extensions.zotero.baseAttachmentPath" => {
                    prefs.base_attachment_path = Some(PathBuf::from(&caps[2]))
                }
                _ => {}
            }
        }
        prefs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILES: &str = "\
[General]
StartWithLastProfile=1

[Profile1]
Name=other
IsRelative=1
Path=Profiles/abc.other

[Profile0]
Name=default
IsRelative=1
Path=Profiles/xyz.default
Default=1
";

    #[test]
    fn test_default_profile_is_found() {
        assert_eq!(default_profile(PROFILES).as_deref(), Some("Profiles/xyz.default"));
        assert_eq!(default_profile("[Profile0]\nPath=p\n"), None);
    }

    #[test]
    fn test_prefs_js() {
        let prefs = ZoteroPrefs::parse(
            r#"
user_pref("extensions.zotero.dataDir", "/home/me/Zotero");
user_pref("extensions.zotero.baseAttachmentPath", "/home/me/Papers");
user_pref("extensions.zotero.sync.server.username", "me");
"#,
        );
        assert_eq!(prefs.data_dir, Some(PathBuf::from("/home/me/Zotero")));
        assert_eq!(prefs.base_attachment_path, Some(PathBuf::from("/home/me/Papers")));
    }

    #[test]
    fn test_zotero_from_profile_directory() {
        let home = tempfile::tempdir().unwrap();
        let main = zotero_home(home.path());
        let profile = main.join("Profiles/xyz.default");
        std::fs::create_dir_all(&profile).unwrap();
        std::fs::write(main.join("profiles.ini"), PROFILES).unwrap();
        std::fs::write(
            profile.join("prefs.js"),
            "user_pref(\"extensions.zotero.dataDir\", \"/srv/zotero\");\n",
        )
        .unwrap();

        let found = zotero(home.path()).unwrap();
        assert_eq!(found.dbpath, PathBuf::from("/srv/zotero/zotero.sqlite"));
        assert_eq!(found.filebase, Some(PathBuf::from("/srv/zotero/storage")));
    }

    #[test]
    fn test_papers3_plist_keys() {
        let mut dict = plist::Dictionary::new();
        dict.insert(
            "mt_papers3_library_location_local".into(),
            Value::String("Papers".into()),
        );
        dict.insert(
            "mt_papers3_full_library_location_shared".into(),
            Value::String("/Users/me/Dropbox/Papers".into()),
        );
        let found = papers3_from_plist(Path::new("/Users/me"), &Value::Dictionary(dict)).unwrap();
        assert_eq!(
            found.dbpath,
            PathBuf::from("/Users/me/Library/Application Support/Papers/Library.papers3/Database.papersdb")
        );
        assert_eq!(found.filebase, Some(PathBuf::from("/Users/me/Dropbox/Papers")));
    }

    #[test]
    fn test_mendeley_plist_keys() {
        let mut dict = plist::Dictionary::new();
        dict.insert("MendeleyWeb.userEmail".into(), Value::String("me@example.org".into()));
        let found = mendeley_from_plist(Path::new("/Users/me"), &Value::Dictionary(dict)).unwrap();
        assert!(found
            .dbpath
            .ends_with("Mendeley Desktop/me@example.org@www.mendeley.com.sqlite"));
        assert!(mendeley_from_plist(Path::new("/"), &Value::Dictionary(plist::Dictionary::new())).is_none());
    }
}
