#[cfg(test)]
mod tests {
    use regex::Regex;
    use restful_booker::{
        data::{auth::Credentials, booking::BookingId},
        fixtures::{self, ScenarioFixtures},
        BookingApiClientBuilder, BookingApiScenario, Error, ScenarioStep, DEFAULT_DOMAIN_NAME,
    };
    use servirtium::{servirtium_playback_test, servirtium_record_test, ServirtiumConfiguration};

    fn configure_servirtium(config: &mut ServirtiumConfiguration) {
        config.set_domain_name(DEFAULT_DOMAIN_NAME);
        config.add_record_request_mutations(|m| {
            m.remove_headers(vec!["cookie"])
                .body_replace(fixtures::DEFAULT_PASSWORD, "REDACTED")
        });
        config.add_record_response_mutations(|m| {
            m.remove_headers(vec!["date", "set-cookie"]).body_replace_regex(
                Regex::new(r#""token":"[^"]*""#).unwrap(),
                r#""token":"REDACTED""#,
            )
        });
    }

    fn scenario_for(base_url: &str) -> BookingApiScenario {
        scenario_with_credentials(base_url, fixtures::default_credentials())
    }

    fn scenario_with_credentials(base_url: &str, credentials: Credentials) -> BookingApiScenario {
        let client = BookingApiClientBuilder::new()
            .with_domain_name(base_url)
            .build();
        BookingApiScenario::new(client, credentials)
    }

    #[servirtium_playback_test("playback_data/booking_lifecycle.md", configure_servirtium)]
    fn booking_lifecycle_playback(base_url: &str) {
        booking_lifecycle(base_url);
    }

    #[servirtium_record_test("playback_data/booking_lifecycle.md", configure_servirtium)]
    #[ignore = "records the live Restful Booker"]
    fn booking_lifecycle_record(base_url: &str) {
        booking_lifecycle(base_url);
    }

    fn booking_lifecycle(base_url: &str) {
        let mut scenario = scenario_for(base_url);

        let report = scenario.run(&ScenarioFixtures::default()).unwrap();

        let failures: Vec<_> = report.failures().collect();
        assert!(failures.is_empty(), "failed steps: {:?}", failures);
        assert_eq!(
            report.outcomes().iter().map(|o| o.step).collect::<Vec<_>>(),
            vec![
                ScenarioStep::ListBookings,
                ScenarioStep::CreateBooking,
                ScenarioStep::PatchBooking,
                ScenarioStep::PutBooking,
                ScenarioStep::DeleteBooking,
            ]
        );
        assert!(report.booking_id.is_some());
    }

    #[servirtium_playback_test("playback_data/bad_credentials.md", configure_servirtium)]
    fn bad_credentials_abort_the_run(base_url: &str) {
        let mut scenario =
            scenario_with_credentials(base_url, Credentials::new("admin", "wrong"));

        match scenario.run(&ScenarioFixtures::default()) {
            Err(error @ Error::AuthFailure(_)) => {
                assert!(error.is_fatal());
                assert_eq!(error.to_string(), "Authentication failed: Bad credentials");
            }
            other => panic!("expected an authentication failure, got {:?}", other),
        }
        assert!(scenario.session_token().is_none());
    }

    #[servirtium_playback_test("playback_data/create_rejected.md", configure_servirtium)]
    fn later_steps_fail_fast_without_a_booking(base_url: &str) {
        let mut scenario = scenario_for(base_url);

        let report = scenario.run(&ScenarioFixtures::default()).unwrap();

        assert!(!report.is_success());
        assert_eq!(report.booking_id, None);

        let outcomes = report.outcomes();
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(
            outcomes[1].result,
            Err(Error::UnexpectedStatus {
                step: ScenarioStep::CreateBooking,
                expected: 200,
                actual: 500
            })
        ));
        for outcome in &outcomes[2..] {
            assert!(
                matches!(
                    outcome.result,
                    Err(Error::MissingPrecondition {
                        missing: "booking id",
                        ..
                    })
                ),
                "{} should not have sent a request: {:?}",
                outcome.step,
                outcome.result
            );
        }
    }

    #[servirtium_playback_test("playback_data/create_echo_mismatch.md", configure_servirtium)]
    fn create_reports_the_mismatched_field(base_url: &str) {
        let mut scenario = scenario_for(base_url);
        scenario.authenticate().unwrap();

        let error = scenario
            .create_booking(&fixtures::original_booking())
            .unwrap_err();

        match error {
            Error::FieldMismatch {
                step,
                field,
                expected,
                actual,
            } => {
                assert_eq!(step, ScenarioStep::CreateBooking);
                assert_eq!(field, "additionalneeds");
                assert_eq!(expected, "\"Test Value\"");
                assert_eq!(actual, "\"\"");
            }
            other => panic!("expected a field mismatch, got {:?}", other),
        }
        // the booking exists even though its echo was wrong
        assert_eq!(scenario.booking_id(), Some(BookingId(4118)));
    }

    #[servirtium_playback_test("playback_data/empty_booking_list.md", configure_servirtium)]
    fn empty_booking_list_fails(base_url: &str) {
        let mut scenario = scenario_for(base_url);
        scenario.authenticate().unwrap();

        let result = scenario.list_bookings();

        assert!(matches!(
            result,
            Err(Error::EmptyBookingList(ScenarioStep::ListBookings))
        ));
    }

    #[servirtium_playback_test("playback_data/delete_forbidden.md", configure_servirtium)]
    fn delete_lifecycle_stops_at_the_rejected_delete(base_url: &str) {
        let mut scenario = scenario_for(base_url);
        scenario.authenticate().unwrap();
        scenario
            .create_booking(&fixtures::original_booking())
            .unwrap();

        let error = scenario.delete_lifecycle().unwrap_err();

        assert!(error.is_assertion_failure());
        assert!(matches!(
            error,
            Error::UnexpectedStatus {
                step: ScenarioStep::DeleteBooking,
                expected: 201,
                actual: 403
            }
        ));
    }
}
