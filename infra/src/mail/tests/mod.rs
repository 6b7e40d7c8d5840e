mod smtp_mail_tests;
