// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for pkt-line parsing.

#[cfg(test)]
mod tests {
    use crate::git::pktline::*;

    const OID_A: &str = "1111111111111111111111111111111111111111";
    const OID_B: &str = "2222222222222222222222222222222222222222";

    fn pkt(line: &str) -> String {
        format!("{:04x}{line}", line.len() + 4)
    }

    fn advertisement(refs: &[(&str, &str)]) -> Vec<u8> {
        let mut body = pkt("# service=git-upload-pack\n");
        body.push_str("0000");
        for (i, (oid, name)) in refs.iter().enumerate() {
            if i == 0 {
                body.push_str(&pkt(&format!("{oid} {name}\0multi_ack side-band-64k\n")));
            } else {
                body.push_str(&pkt(&format!("{oid} {name}\n")));
            }
        }
        body.push_str("0000");
        body.into_bytes()
    }

    #[test]
    fn test_parse_advertisement() {
        let body = advertisement(&[
            (OID_A, "HEAD"),
            (OID_A, "refs/heads/master"),
            (OID_B, "refs/tags/v1.0"),
        ]);

        let refs = parse_ref_advertisement(&body).unwrap();

        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0].name, "HEAD");
        assert_eq!(refs[1].name, "refs/heads/master");
        assert_eq!(refs[2].object_id, OID_B);
    }

    #[test]
    fn test_capabilities_are_stripped() {
        let body = advertisement(&[(OID_A, "refs/heads/main")]);
        let refs = parse_ref_advertisement(&body).unwrap();

        assert_eq!(refs[0].name, "refs/heads/main");
    }

    #[test]
    fn test_empty_repository() {
        let zero = "0".repeat(40);
        let body = advertisement(&[(&zero, "capabilities^{}")]);

        assert!(parse_ref_advertisement(&body).unwrap().is_empty());
    }

    #[test]
    fn test_html_body_is_rejected() {
        let err = parse_ref_advertisement(b"<html><body>Sign in</body></html>").unwrap_err();
        assert_eq!(err, PktLineError::InvalidLength { offset: 0 });
    }

    #[test]
    fn test_truncated_body_is_rejected() {
        let mut body = pkt(&format!("{OID_A} refs/heads/master\n"));
        body.truncate(body.len() - 5);

        let err = parse_ref_advertisement(body.as_bytes()).unwrap_err();
        assert!(matches!(err, PktLineError::Truncated { offset: 0, .. }));
    }

    #[test]
    fn test_has_ref_matches_branches_and_tags() {
        let refs = parse_ref_advertisement(&advertisement(&[
            (OID_A, "refs/heads/master"),
            (OID_B, "refs/tags/v1.0"),
        ]))
        .unwrap();

        assert!(has_ref(&refs, "master"));
        assert!(has_ref(&refs, "refs/heads/master"));
        assert!(has_ref(&refs, "v1.0"));
        assert!(!has_ref(&refs, "develop"));
        assert!(!has_ref(&refs, "heads/master"));
    }

    #[test]
    fn test_parse_ls_remote() {
        let output = format!("{OID_A}\trefs/heads/master\n{OID_B}\trefs/tags/v2\nwarning: noise\n");
        let refs = parse_ls_remote(&output);

        assert_eq!(refs.len(), 2);
        assert!(has_ref(&refs, "master"));
        assert!(has_ref(&refs, "v2"));
    }
}
