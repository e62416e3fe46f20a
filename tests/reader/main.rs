mod reset_test;
