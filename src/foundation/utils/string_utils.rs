use regex::Regex;

/// Extracts the app id from a Steam manifest file name.
///
/// Steam keeps one `appmanifest_<id>.acf` file per installed game in its
/// `steamapps` directory. Any other file name yields `None`.
///
/// # Examples
///
/// ```
/// use steamlib::foundation::utils::manifest_app_id;
///
/// assert_eq!(manifest_app_id("appmanifest_440.acf"), Some("440".to_string()));
/// assert_eq!(manifest_app_id("libraryfolders.vdf"), None);
/// ```
pub fn manifest_app_id(file_name: &str) -> Option<String> {
    let re = Regex::new(r"^appmanifest_(\d+)\.acf$").unwrap();
    re.captures(file_name)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parses an hour count as written in the community feed.
///
/// The feed formats large values with thousands separators ("1,234.5").
///
/// # Examples
///
/// ```
/// use steamlib::foundation::utils::parse_hours;
///
/// assert_eq!(parse_hours(" 1,234.5 "), Some(1234.5));
/// assert_eq!(parse_hours("n/a"), None);
/// ```
pub fn parse_hours(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|hours| hours.is_finite())
}

/// Returns the file name part of an executable path.
///
/// Both `/` and `\` are treated as separators so a Windows path configured
/// on another machine still resolves to `steam.exe`.
pub fn executable_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Returns the directory holding an executable, with the file name stripped.
pub fn executable_dir(path: &str) -> &str {
    let name = executable_name(path);
    path[..path.len() - name.len()].trim_end_matches(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_app_id() {
        assert_eq!(manifest_app_id("appmanifest_10.acf"), Some("10".to_string()));
        assert_eq!(manifest_app_id("appmanifest_.acf"), None);
        assert_eq!(manifest_app_id("appmanifest_10.acf.bak"), None);
        assert_eq!(manifest_app_id("common"), None);
    }

    #[test]
    fn test_parse_hours() {
        assert_eq!(parse_hours("0.5"), Some(0.5));
        assert_eq!(parse_hours("12"), Some(12.0));
        assert_eq!(parse_hours("2,001.3"), Some(2001.3));
        assert_eq!(parse_hours(""), None);
        assert_eq!(parse_hours("NaN"), None);
    }

    #[test]
    fn test_executable_name_and_dir() {
        let windows = r"C:\Program Files (x86)\Steam\steam.exe";
        assert_eq!(executable_name(windows), "steam.exe");
        assert_eq!(executable_dir(windows), r"C:\Program Files (x86)\Steam");

        let unix = "/home/user/.steam/steam.sh";
        assert_eq!(executable_name(unix), "steam.sh");
        assert_eq!(executable_dir(unix), "/home/user/.steam");

        assert_eq!(executable_name("steam.exe"), "steam.exe");
        assert_eq!(executable_dir("steam.exe"), "");
    }
}
