use crate::{BedrockVersionSource, SupervisorError};

use googletest::assert_that;
use googletest::prelude::eq;

const PAGE: &str = r#"
<a href="https://minecraft.azureedge.net/bin-win/bedrock-server-1.20.81.01.zip">Windows</a>
<a href="https://minecraft.azureedge.net/bin-linux/bedrock-server-1.20.81.01.zip" class="btn">Linux</a>
"#;

#[test]
fn given_download_page_when_extract_version_then_linux_version_returned() {
    let version = BedrockVersionSource::extract_version(PAGE).unwrap();

    assert_that!(version.as_str(), eq("1.20.81.01"));
}

#[test]
fn given_page_without_linux_link_when_extract_version_then_parse_error() {
    let page = r#"<a href="https://minecraft.azureedge.net/bin-win/bedrock-server-1.0.zip">"#;

    let result = BedrockVersionSource::extract_version(page);

    assert!(matches!(result, Err(SupervisorError::Parse { .. })));
    assert!(result.unwrap_err().is_transient());
}

#[test]
fn given_linux_link_without_archive_name_when_extract_version_then_parse_error() {
    let page = r#"<a href="https://minecraft.azureedge.net/bin-linux/readme.txt">"#;

    let result = BedrockVersionSource::extract_version(page);

    assert!(matches!(result, Err(SupervisorError::Parse { .. })));
}
