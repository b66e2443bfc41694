use std::env;
use std::path::Path;
use urlencoding::decode;

/// Normalize a source-file path so that the paths coming out of the
/// disassembler's location markers and the paths the IDE frontend sends us
/// compare equal. Handles file:// URIs, WSL mount paths, relative paths,
/// and forces forward slashes with an upper-case drive letter on Windows.
pub fn canonicalize_path(source_path: &str) -> String {
    let mut path_str = source_path.to_string();

    // file:// URIs, percent-encoded (editors love to hand us these)
    if let Some(rest) = path_str.strip_prefix("file://") {
        let decoded = decode(rest).unwrap_or_else(|_| rest.into());
        path_str = decoded.into_owned();
        // On Windows, file:///C:/... decodes to /C:/..., strip the slash
        if cfg!(windows) && path_str.starts_with('/') && path_str.chars().nth(2) == Some(':') {
            path_str.remove(0);
        }
    }

    // WSL mount paths: /mnt/c/... -> C:/...
    if let Some(rest) = path_str.strip_prefix("/mnt/") {
        let mut parts = rest.splitn(2, '/');
        let drive = parts.next().unwrap_or("");
        if drive.len() == 1 {
            let remaining = parts.next().unwrap_or("");
            path_str = format!("{}:/{}", drive.to_uppercase(), remaining);
        }
    }

    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().unwrap_or_default().join(path)
    };

    // dunce resolves . and .. and strips Windows \\?\ verbatim prefixes.
    // Falls back to the lexical path when the file does not exist.
    let canonical = dunce::canonicalize(&absolute).unwrap_or(absolute);

    let mut final_path = canonical.to_string_lossy().replace('\\', "/");

    // C:/ not c:/
    if cfg!(windows) && final_path.chars().nth(1) == Some(':') {
        if let Some(drive) = final_path.chars().next() {
            final_path = format!("{}{}", drive.to_uppercase(), &final_path[1..]);
        }
    }

    final_path
}
