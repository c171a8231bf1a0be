//! Property tests over generated exchanges.

use crawlwarc_codec::Digester;
use crawlwarc_core::{DigestAlgorithm, Exchange, RecordBuilder, WarcDate};
use crawlwarc_testkit::prelude::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn written_archives_are_well_formed(
        exchanges in prop::collection::vec(exchange_strategy(), 1..6),
        max in 500u64..20_000,
    ) {
        let dest = TestDest::new();
        let mut writer = dest.writer(|s| s.max_warc_size(max));

        let mut counts = Vec::new();
        for (response, request) in &exchanges {
            writer.write(response, request).unwrap();
            counts.push(writer.warc_count());
        }

        prop_assert!(counts.windows(2).all(|w| w[0] <= w[1]));

        let archives = dest.archives();
        prop_assert_eq!(archives.len(), writer.warc_count() as usize);

        let mut total = 0;
        for path in &archives {
            let summary = check_archive(path).map_err(TestCaseError::fail)?;
            total += summary.exchanges;
        }
        prop_assert_eq!(total, exchanges.len());
        prop_assert_eq!(writer.stats().exchanges(), exchanges.len() as u64);
    }

    #[test]
    fn preset_dates_survive_verbatim((response, request) in exchange_strategy(), date in warc_date_strategy()) {
        let dest = TestDest::new();
        let mut writer = dest.writer(|s| s);
        let request = request.warc_date(date.clone());

        writer.write(&response, &request).unwrap();

        let records = read_archive(&dest.archives()[0]);
        prop_assert_eq!(records[1].date(), Some(date.as_str()));
        prop_assert_eq!(records[2].date(), Some(date.as_str()));
    }

    #[test]
    fn records_account_for_their_blocks((response, request) in exchange_strategy()) {
        let date = request.meta.warc_date.clone().unwrap_or_else(WarcDate::now);
        let exchange = Exchange::new(&request, &response, &date);
        let digester = Digester::new(DigestAlgorithm::Sha1);
        let builder = RecordBuilder::new(digester);

        let req = builder.build_request(&exchange).unwrap();
        let resp = builder.build_response(&exchange, req.record_id()).unwrap();

        for record in [&req, &resp] {
            prop_assert_eq!(record.content_length(), record.content_block().len() as u64);
            prop_assert_eq!(record.payload_digest(), &digester.digest(record.content_block()));
        }
        prop_assert_eq!(resp.concurrent_to(), Some(req.record_id()));
        prop_assert!(resp.content_block().ends_with(&response.body));
    }

    #[test]
    fn digest_is_deterministic(block in body_strategy()) {
        for algorithm in [DigestAlgorithm::Sha1, DigestAlgorithm::Sha256] {
            let digester = Digester::new(algorithm);
            prop_assert_eq!(digester.digest(&block), digester.digest(&block.clone()));
        }
    }
}
